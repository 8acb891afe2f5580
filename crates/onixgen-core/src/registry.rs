//! Module Registry Assembler.
//!
//! Produces the root [`AdapterDocument`]: application identity, logging,
//! listener settings, plugin manager root, and the five route-addressable
//! [`Module`]s. Module paths share the prefix
//! `/api-service/<domain>/<version>/` and differ in their last segment.

use crate::error::{SynthError, SynthResult};
use crate::params::ParameterSet;
use crate::pipeline::{build_handler, Handler, PipelineKind};
use crate::plugin::{Role, PLUGIN_ROOT};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// First path segment of every module.
pub const SERVICE_ROOT: &str = "api-service";

/// Context keys the gateway attaches to every log line.
pub const LOG_CONTEXT_KEYS: [&str; 4] = ["transaction_id", "message_id", "subscriber_id", "module_id"];

// ─────────────────────────────────────────────────────────────────────────────
// Document sections
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDestination {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfig {
    pub level: String,
    pub destinations: Vec<LogDestination>,
    pub context_keys: Vec<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            destinations: vec![LogDestination {
                kind: "stdout".to_string(),
            }],
            context_keys: LOG_CONTEXT_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Listener timeouts, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTimeouts {
    pub read: u32,
    pub write: u32,
    pub idle: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub port: u16,
    pub timeout: HttpTimeouts,
}

impl HttpConfig {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            timeout: HttpTimeouts {
                read: 30,
                write: 30,
                idle: 30,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManagerConfig {
    pub root: String,
}

/// A routable unit: URL path prefix plus handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub path: String,
    pub handler: Handler,
}

/// Root aggregate handed to the serializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterDocument {
    pub app_name: String,
    pub log: LogConfig,
    pub http: HttpConfig,
    pub plugin_manager: PluginManagerConfig,
    pub modules: Vec<Module>,
}

impl AdapterDocument {
    /// Validate the structural invariants the gateway relies on.
    ///
    /// Returns the first violation found:
    /// 1. No two modules share a path.
    /// 2. Every handler's steps have their plugins bound.
    /// 3. Every handler's steps are in pipeline order.
    pub fn validate(&self) -> SynthResult<()> {
        let mut paths: HashSet<&str> = HashSet::new();
        for module in &self.modules {
            if !paths.insert(module.path.as_str()) {
                return Err(SynthError::DuplicateModulePath(module.path.clone()));
            }
        }
        for module in &self.modules {
            module.handler.validate(&module.name)?;
        }
        Ok(())
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Assembly
// ─────────────────────────────────────────────────────────────────────────────

/// The five handlers of an adapter document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handlers {
    pub form_receiver: Handler,
    pub standalone_validator: Handler,
    pub bap_receiver: Handler,
    pub bpp_receiver: Handler,
    pub mock_caller: Handler,
}

impl Handlers {
    /// Build all five handlers from their pipeline templates.
    pub fn assemble(params: &ParameterSet) -> Self {
        Self {
            form_receiver: build_handler(params, PipelineKind::FormReceiver),
            standalone_validator: build_handler(params, PipelineKind::StandaloneValidator),
            bap_receiver: build_handler(params, PipelineKind::Receiver(Role::Bap)),
            bpp_receiver: build_handler(params, PipelineKind::Receiver(Role::Bpp)),
            mock_caller: build_handler(params, PipelineKind::MockCaller),
        }
    }
}

fn module_path(params: &ParameterSet, segment: &str) -> String {
    format!(
        "/{SERVICE_ROOT}/{}/{}/{segment}",
        params.domain(),
        params.version()
    )
}

/// Assemble the adapter document from `params` and prebuilt `handlers`.
pub fn build_adapter_document(params: &ParameterSet, handlers: Handlers) -> AdapterDocument {
    let module = |name: &str, segment: &str, handler: Handler| Module {
        name: name.to_string(),
        path: module_path(params, segment),
        handler,
    };

    AdapterDocument {
        app_name: params.app_name(),
        log: LogConfig::default(),
        http: HttpConfig::new(params.port()),
        plugin_manager: PluginManagerConfig {
            root: PLUGIN_ROOT.to_string(),
        },
        modules: vec![
            module("formReceiver", "form/html-form", handlers.form_receiver),
            module("standaloneValidator", "test/", handlers.standalone_validator),
            module("BapTxnReceiver", "seller/", handlers.bap_receiver),
            module("BppTxnReceiver", "buyer/", handlers.bpp_receiver),
            module("mockTxnCaller", "mock/", handlers.mock_caller),
        ],
    }
}
