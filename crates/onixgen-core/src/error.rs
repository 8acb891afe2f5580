//! Error types for `onixgen-core`.
//!
//! [`SynthError`] covers every failure mode of a synthesis run. All of them
//! are detected before any document leaves the crate: invalid deployment
//! parameters, requests for a router / audit sink / pipeline / document kind
//! outside the fixed set, and structural violations in an assembled adapter
//! document. None of them is recoverable locally; the caller aborts the run.

use thiserror::Error;

/// Failure of a single synthesis run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SynthError {
    // ── Parameters ───────────────────────────────────────────────────────────
    /// A Parameter Set field is missing or malformed.
    #[error("invalid parameter '{field}': {reason}")]
    InvalidParameter {
        /// Name of the offending field as it appears in the Parameter Set.
        field: &'static str,
        /// Human-readable description of what is wrong with it.
        reason: String,
    },

    // ── Unknown builder requests ─────────────────────────────────────────────
    /// A routing table was requested for a router kind that does not exist.
    #[error("unknown router kind '{0}' (expected form, mock or np)")]
    UnknownRouter(String),

    /// An audit remap was requested for a sink that does not exist.
    #[error("unknown audit sink '{0}' (expected mock or np)")]
    UnknownAuditSink(String),

    /// A handler was requested for a pipeline kind that does not exist.
    #[error("unknown pipeline kind '{0}'")]
    UnknownPipeline(String),

    /// A rendered document was requested by a name that does not exist.
    #[error("unknown document '{0}'")]
    UnknownDocument(String),

    // ── Adapter document structure ───────────────────────────────────────────
    /// Two modules in the same adapter document share a path.
    #[error("module path '{0}' is used by more than one module")]
    DuplicateModulePath(String),

    /// A handler references a step whose plugin is not bound.
    #[error("module '{module}': step '{step}' requires plugin slot '{slot}'")]
    MissingPlugin {
        /// Module whose handler is incoherent.
        module: String,
        /// Step name as serialized.
        step: String,
        /// Plugin slot the step needs.
        slot: String,
    },

    /// A handler lists its steps out of pipeline order.
    #[error("module '{module}': steps are not in pipeline order")]
    StepOrder {
        /// Module whose handler is out of order.
        module: String,
    },

    // ── Serialization ────────────────────────────────────────────────────────
    /// A document could not be rendered or parsed.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl SynthError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}

impl From<serde_yaml::Error> for SynthError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;
