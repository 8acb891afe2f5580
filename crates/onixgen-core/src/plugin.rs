//! Plugin Binding Builder.
//!
//! A [`PluginBinding`] is a named reference to a gateway plugin plus its
//! configuration block. Bindings are plain values: the same cache binding is
//! built once per handler that needs it and serializes identically each time.
//!
//! Role and module-type casing is fixed by [`Role`] and [`ModuleType`]: the
//! workbench plugin always sees `BAP`/`BPP` and `receiver`/`caller`, while
//! handlers carry the lower-cased role.

use crate::audit::AuditSink;
use crate::error::SynthError;
use crate::params::ParameterSet;
use crate::routing::RouterKind;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::str::FromStr;

/// Directory the gateway loads plugin binaries from.
pub const PLUGIN_ROOT: &str = "./plugins";

/// Directory, relative to the gateway working dir, holding the routing and
/// audit documents referenced by plugin bindings.
pub const CONFIG_ROOT: &str = "./config";

// ─────────────────────────────────────────────────────────────────────────────
// Roles
// ─────────────────────────────────────────────────────────────────────────────

/// Network role a handler acts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Buyer application platform.
    Bap,
    /// Buyer application provider (seller side).
    Bpp,
}

impl Role {
    /// Form used for handler `role` fields.
    pub fn as_lower(self) -> &'static str {
        match self {
            Role::Bap => "bap",
            Role::Bpp => "bpp",
        }
    }

    /// Form used for the workbench `moduleRole` field.
    pub fn as_upper(self) -> &'static str {
        match self {
            Role::Bap => "BAP",
            Role::Bpp => "BPP",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_lower())
    }
}

impl FromStr for Role {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bap" => Ok(Role::Bap),
            "bpp" => Ok(Role::Bpp),
            _ => Err(SynthError::invalid("role", format!("unknown role '{s}'"))),
        }
    }
}

/// Direction of a workbench module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Receiver,
    Caller,
}

impl ModuleType {
    pub fn as_str(self) -> &'static str {
        match self {
            ModuleType::Receiver => "receiver",
            ModuleType::Caller => "caller",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bindings
// ─────────────────────────────────────────────────────────────────────────────

/// Named, configured reference to a gateway plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginBinding {
    /// Plugin id as known to the gateway plugin manager.
    pub id: String,
    /// Plugin-specific configuration, key order preserved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Mapping>,
}

impl PluginBinding {
    /// A binding without configuration.
    pub fn bare(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            config: None,
        }
    }

    /// A binding with the given configuration entries, in order.
    pub fn with_config<I, K>(id: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            id: id.into(),
            config: Some(
                entries
                    .into_iter()
                    .map(|(k, v)| (Value::String(k.into()), v))
                    .collect(),
            ),
        }
    }

    /// Look up a configuration value by key.
    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.as_ref().and_then(|c| c.get(key))
    }
}

/// Every plugin the synthesizer knows how to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    Cache,
    KeyManager,
    SchemaValidator,
    /// Protocol payload validator. Stateful validation cross-checks a call
    /// against earlier calls of the same transaction.
    ProtocolValidator { stateful: bool },
    SignValidator,
    Signer,
    Router(RouterKind),
    Observability(AuditSink),
    Workbench { role: Role, module_type: ModuleType },
}

impl PluginKind {
    /// The handler slot this plugin occupies.
    pub fn slot(self) -> PluginSlot {
        match self {
            PluginKind::Cache => PluginSlot::Cache,
            PluginKind::KeyManager => PluginSlot::KeyManager,
            PluginKind::SchemaValidator => PluginSlot::SchemaValidator,
            PluginKind::ProtocolValidator { .. } => PluginSlot::OndcValidator,
            PluginKind::SignValidator => PluginSlot::SignValidator,
            PluginKind::Signer => PluginSlot::Signer,
            PluginKind::Router(_) => PluginSlot::Router,
            PluginKind::Observability(_) => PluginSlot::Middleware,
            PluginKind::Workbench { .. } => PluginSlot::OndcWorkbench,
        }
    }
}

/// Named position in a handler's plugin map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginSlot {
    Cache,
    KeyManager,
    Middleware,
    Router,
    SchemaValidator,
    OndcValidator,
    OndcWorkbench,
    SignValidator,
    Signer,
}

impl PluginSlot {
    /// Key of this slot in the serialized plugin map.
    pub fn as_str(self) -> &'static str {
        match self {
            PluginSlot::Cache => "cache",
            PluginSlot::KeyManager => "keyManager",
            PluginSlot::Middleware => "middleware",
            PluginSlot::Router => "router",
            PluginSlot::SchemaValidator => "schemaValidator",
            PluginSlot::OndcValidator => "ondcValidator",
            PluginSlot::OndcWorkbench => "ondcWorkbench",
            PluginSlot::SignValidator => "signValidator",
            PluginSlot::Signer => "signer",
        }
    }
}

impl fmt::Display for PluginSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the binding for `kind` under `params`.
///
/// Pure: identical inputs always give structurally identical bindings.
pub fn build_plugin(params: &ParameterSet, kind: PluginKind) -> PluginBinding {
    match kind {
        PluginKind::Cache => PluginBinding::with_config(
            "cache",
            [("addr", Value::String(params.cache_address().to_string()))],
        ),
        PluginKind::KeyManager => PluginBinding::bare("keymanager"),
        PluginKind::SchemaValidator => PluginBinding::with_config(
            "schemavalidator",
            [("schemaDir", Value::String("./schemas".to_string()))],
        ),
        PluginKind::ProtocolValidator { stateful } => PluginBinding::with_config(
            "ondcvalidator",
            [
                ("stateFullValidations", Value::Bool(stateful)),
                ("debugMode", Value::Bool(false)),
            ],
        ),
        PluginKind::SignValidator => PluginBinding::bare("signvalidator"),
        PluginKind::Signer => PluginBinding::bare("signer"),
        PluginKind::Router(router) => PluginBinding::with_config(
            "router",
            [(
                "routingConfig",
                Value::String(format!("{CONFIG_ROOT}/{}", router.file_name())),
            )],
        ),
        PluginKind::Observability(sink) => PluginBinding::with_config(
            "networkobservability",
            [(
                "configPath",
                Value::String(format!("{CONFIG_ROOT}/{}", sink.file_name())),
            )],
        ),
        PluginKind::Workbench { role, module_type } => PluginBinding::with_config(
            "workbench",
            [
                ("protocolVersion", Value::String(params.version().to_string())),
                ("protocolDomain", Value::String(params.domain().to_string())),
                ("moduleRole", Value::String(role.as_upper().to_string())),
                ("moduleType", Value::String(module_type.as_str().to_string())),
                (
                    "configServiceURL",
                    Value::String(params.config_service_url().to_string()),
                ),
                (
                    "mockServiceURL",
                    Value::String(params.mock_service_url().to_string()),
                ),
            ],
        ),
    }
}
