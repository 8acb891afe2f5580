//! # onixgen-core
//!
//! Synthesizes the declarative configuration of a multi-role ONIX gateway
//! adapter from a handful of deployment parameters.
//!
//! ```text
//! ParameterSet ─┬─► plugin   (Plugin Bindings)
//!               ├─► routing  (RoutingTable per router)
//!               └─► audit    (AuditRemap per sink)
//!                      │
//!                      ▼
//!               pipeline (Handlers) ─► registry (AdapterDocument) ─► render
//! ```
//!
//! Every builder is a pure function of its inputs. The crate performs no I/O;
//! [`synthesize`] returns a path → YAML map for the caller to write.
//!
//! ```rust,no_run
//! use onixgen_core::{synthesize, RawParameters};
//!
//! let params = RawParameters::new("ONDC:RET11", "2.0.0")
//!     .with_cache_address("localhost:6379")
//!     .with_audit_grpc_url("recorder:9000")
//!     .resolve()
//!     .expect("valid parameters");
//!
//! for (path, yaml) in synthesize(&params).expect("synthesis").iter() {
//!     println!("--- {path}\n{yaml}");
//! }
//! ```

pub mod audit;
pub mod error;
pub mod params;
pub mod pipeline;
pub mod plugin;
pub mod registry;
pub mod render;
pub mod routing;

pub use audit::{build_audit_remap, AuditRemap, AuditSink};
pub use error::{SynthError, SynthResult};
pub use params::{ParameterSet, RawParameters};
pub use pipeline::{build_handler, Handler, PipelineKind, Step};
pub use plugin::{build_plugin, PluginBinding, PluginKind, Role};
pub use registry::{build_adapter_document, AdapterDocument, Handlers, Module};
pub use render::{
    adapter_document, parse_adapter, render_document, synthesize, to_yaml, ConfigDocument,
    RenderedConfig,
};
pub use routing::{build_routing_table, RouterKind, RoutingTable, ACTION_CATALOG};
