//! Pipeline Assembler.
//!
//! A [`Handler`] is an ordered list of [`Step`]s plus the plugins those
//! steps run on. The gateway executes steps in list order, so each pipeline
//! kind has one fixed step template:
//!
//! ```text
//! receiver       receive ─► addRoute ─► schema ─► payload ─► context ─► validateSign ─► save
//! mock caller    receive ─► addRoute ─► schema ───────────► context ─► sign ─────────► save
//! form           addRoute
//! standalone                           schema ─► payload
//! ```

use crate::audit::AuditSink;
use crate::error::{SynthError, SynthResult};
use crate::params::ParameterSet;
use crate::plugin::{build_plugin, ModuleType, PluginBinding, PluginKind, PluginSlot, Role};
use crate::routing::RouterKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─────────────────────────────────────────────────────────────────────────────
// Steps
// ─────────────────────────────────────────────────────────────────────────────

/// One pipeline stage, interpreted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    /// Workbench intake: establishes the transaction context.
    OndcWorkbenchReceiver,
    AddRoute,
    ValidateSchema,
    ValidateOndcPayload,
    OndcWorkbenchValidateContext,
    ValidateSign,
    Sign,
    /// Persist the call for later stateful validation.
    ValidateOndcCallSave,
}

impl Step {
    /// Plugin slots that must be bound for this step to run.
    pub fn required_slots(self) -> &'static [PluginSlot] {
        match self {
            Step::OndcWorkbenchReceiver | Step::OndcWorkbenchValidateContext => {
                &[PluginSlot::OndcWorkbench]
            }
            Step::AddRoute => &[PluginSlot::Router],
            Step::ValidateSchema => &[PluginSlot::SchemaValidator],
            Step::ValidateOndcPayload => &[PluginSlot::OndcValidator],
            Step::ValidateSign => &[PluginSlot::SignValidator, PluginSlot::KeyManager],
            Step::Sign => &[PluginSlot::Signer, PluginSlot::KeyManager],
            Step::ValidateOndcCallSave => &[PluginSlot::OndcValidator, PluginSlot::Cache],
        }
    }

    /// Pipeline phase. Steps in a handler must have strictly increasing phase.
    fn phase(self) -> u8 {
        match self {
            Step::OndcWorkbenchReceiver => 0,
            Step::AddRoute => 1,
            Step::ValidateSchema => 2,
            Step::ValidateOndcPayload => 3,
            Step::OndcWorkbenchValidateContext => 4,
            Step::ValidateSign | Step::Sign => 5,
            Step::ValidateOndcCallSave => 6,
        }
    }

    /// Serialized name.
    pub fn as_str(self) -> &'static str {
        match self {
            Step::OndcWorkbenchReceiver => "ondcWorkbenchReceiver",
            Step::AddRoute => "addRoute",
            Step::ValidateSchema => "validateSchema",
            Step::ValidateOndcPayload => "validateOndcPayload",
            Step::OndcWorkbenchValidateContext => "ondcWorkbenchValidateContext",
            Step::ValidateSign => "validateSign",
            Step::Sign => "sign",
            Step::ValidateOndcCallSave => "validateOndcCallSave",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const RECEIVER_STEPS: [Step; 7] = [
    Step::OndcWorkbenchReceiver,
    Step::AddRoute,
    Step::ValidateSchema,
    Step::ValidateOndcPayload,
    Step::OndcWorkbenchValidateContext,
    Step::ValidateSign,
    Step::ValidateOndcCallSave,
];

pub const MOCK_CALLER_STEPS: [Step; 6] = [
    Step::OndcWorkbenchReceiver,
    Step::AddRoute,
    Step::ValidateSchema,
    Step::OndcWorkbenchValidateContext,
    Step::Sign,
    Step::ValidateOndcCallSave,
];

pub const FORM_STEPS: [Step; 1] = [Step::AddRoute];

pub const STANDALONE_STEPS: [Step; 2] = [Step::ValidateSchema, Step::ValidateOndcPayload];

// ─────────────────────────────────────────────────────────────────────────────
// Handler
// ─────────────────────────────────────────────────────────────────────────────

/// Connection pool settings of the handler's upstream HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpClientConfig {
    pub max_idle_conns: u32,
    pub max_idle_conns_per_host: u32,
    pub idle_conn_timeout: String,
    pub response_header_timeout: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            max_idle_conns: 1000,
            max_idle_conns_per_host: 200,
            idle_conn_timeout: "300s".to_string(),
            response_header_timeout: "5s".to_string(),
        }
    }
}

/// Handler implementation the gateway instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerType {
    Std,
}

/// Plugins bound to a handler, keyed by slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<PluginBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_manager: Option<PluginBinding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middleware: Vec<PluginBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router: Option<PluginBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_validator: Option<PluginBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ondc_validator: Option<PluginBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ondc_workbench: Option<PluginBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_validator: Option<PluginBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<PluginBinding>,
}

impl PluginSet {
    /// Build and bind each plugin kind into its slot.
    ///
    /// Observability bindings accumulate in the middleware list; every other
    /// kind replaces whatever occupied its slot.
    pub fn from_kinds(params: &ParameterSet, kinds: &[PluginKind]) -> Self {
        let mut set = Self::default();
        for &kind in kinds {
            let binding = build_plugin(params, kind);
            match set.slot_mut(kind.slot()) {
                Some(target) => *target = Some(binding),
                None => set.middleware.push(binding),
            }
        }
        set
    }

    /// Single-binding slot storage; `None` for the middleware list.
    fn slot_mut(&mut self, slot: PluginSlot) -> Option<&mut Option<PluginBinding>> {
        match slot {
            PluginSlot::Cache => Some(&mut self.cache),
            PluginSlot::KeyManager => Some(&mut self.key_manager),
            PluginSlot::Router => Some(&mut self.router),
            PluginSlot::SchemaValidator => Some(&mut self.schema_validator),
            PluginSlot::OndcValidator => Some(&mut self.ondc_validator),
            PluginSlot::OndcWorkbench => Some(&mut self.ondc_workbench),
            PluginSlot::SignValidator => Some(&mut self.sign_validator),
            PluginSlot::Signer => Some(&mut self.signer),
            PluginSlot::Middleware => None,
        }
    }

    /// Whether anything is bound in `slot`.
    pub fn has(&self, slot: PluginSlot) -> bool {
        match slot {
            PluginSlot::Cache => self.cache.is_some(),
            PluginSlot::KeyManager => self.key_manager.is_some(),
            PluginSlot::Middleware => !self.middleware.is_empty(),
            PluginSlot::Router => self.router.is_some(),
            PluginSlot::SchemaValidator => self.schema_validator.is_some(),
            PluginSlot::OndcValidator => self.ondc_validator.is_some(),
            PluginSlot::OndcWorkbench => self.ondc_workbench.is_some(),
            PluginSlot::SignValidator => self.sign_validator.is_some(),
            PluginSlot::Signer => self.signer.is_some(),
        }
    }
}

/// An ordered step pipeline with its plugins, bound to one network role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handler {
    #[serde(rename = "type")]
    pub handler_type: HandlerType,
    pub role: Role,
    pub http_client_config: HttpClientConfig,
    pub plugins: PluginSet,
    pub steps: Vec<Step>,
}

impl Handler {
    /// Check that every step has its plugins bound and that steps follow
    /// pipeline order. `module` names the owner in errors.
    pub fn validate(&self, module: &str) -> SynthResult<()> {
        for step in &self.steps {
            if let Some(slot) = step
                .required_slots()
                .iter()
                .find(|slot| !self.plugins.has(**slot))
            {
                return Err(SynthError::MissingPlugin {
                    module: module.to_string(),
                    step: step.to_string(),
                    slot: slot.to_string(),
                });
            }
        }

        if self.steps.windows(2).any(|w| w[0].phase() >= w[1].phase()) {
            return Err(SynthError::StepOrder {
                module: module.to_string(),
            });
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pipeline kinds
// ─────────────────────────────────────────────────────────────────────────────

/// The five handler shapes an adapter document contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Full transaction receiver for the given role.
    Receiver(Role),
    /// Outbound caller impersonating a seller-side counterpart.
    MockCaller,
    /// Forwards HTML form submissions.
    FormReceiver,
    /// Stateless single-pass validation.
    StandaloneValidator,
}

impl PipelineKind {
    /// The fixed step template of this pipeline.
    pub fn steps(self) -> &'static [Step] {
        match self {
            PipelineKind::Receiver(_) => &RECEIVER_STEPS,
            PipelineKind::MockCaller => &MOCK_CALLER_STEPS,
            PipelineKind::FormReceiver => &FORM_STEPS,
            PipelineKind::StandaloneValidator => &STANDALONE_STEPS,
        }
    }

    /// Role written into the handler.
    pub fn role(self) -> Role {
        match self {
            PipelineKind::Receiver(role) => role,
            PipelineKind::MockCaller => Role::Bpp,
            PipelineKind::FormReceiver | PipelineKind::StandaloneValidator => Role::Bap,
        }
    }

    /// Plugins the pipeline binds, in slot order.
    pub fn plugins(self) -> Vec<PluginKind> {
        match self {
            PipelineKind::Receiver(role) => vec![
                PluginKind::Cache,
                PluginKind::KeyManager,
                PluginKind::Observability(AuditSink::NetworkPeer),
                PluginKind::Router(RouterKind::NetworkPeer),
                PluginKind::SchemaValidator,
                PluginKind::ProtocolValidator { stateful: true },
                PluginKind::Workbench {
                    role,
                    module_type: ModuleType::Receiver,
                },
                PluginKind::SignValidator,
            ],
            PipelineKind::MockCaller => vec![
                PluginKind::Cache,
                PluginKind::KeyManager,
                PluginKind::Observability(AuditSink::Mock),
                PluginKind::Router(RouterKind::Mock),
                PluginKind::SchemaValidator,
                PluginKind::ProtocolValidator { stateful: true },
                PluginKind::Workbench {
                    role: Role::Bap,
                    module_type: ModuleType::Caller,
                },
                PluginKind::Signer,
            ],
            PipelineKind::FormReceiver => vec![PluginKind::Router(RouterKind::Form)],
            PipelineKind::StandaloneValidator => vec![
                PluginKind::SchemaValidator,
                PluginKind::ProtocolValidator { stateful: false },
            ],
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineKind::Receiver(role) => write!(f, "{role}-receiver"),
            PipelineKind::MockCaller => f.write_str("mock-caller"),
            PipelineKind::FormReceiver => f.write_str("form-receiver"),
            PipelineKind::StandaloneValidator => f.write_str("standalone-validator"),
        }
    }
}

impl FromStr for PipelineKind {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bap-receiver" => Ok(PipelineKind::Receiver(Role::Bap)),
            "bpp-receiver" => Ok(PipelineKind::Receiver(Role::Bpp)),
            "mock-caller" => Ok(PipelineKind::MockCaller),
            "form-receiver" => Ok(PipelineKind::FormReceiver),
            "standalone-validator" => Ok(PipelineKind::StandaloneValidator),
            other => Err(SynthError::UnknownPipeline(other.to_string())),
        }
    }
}

/// Assemble the handler for `kind`.
pub fn build_handler(params: &ParameterSet, kind: PipelineKind) -> Handler {
    Handler {
        handler_type: HandlerType::Std,
        role: kind.role(),
        http_client_config: HttpClientConfig::default(),
        plugins: PluginSet::from_kinds(params, &kind.plugins()),
        steps: kind.steps().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RawParameters;
    use serde_yaml::Value;

    const ALL_KINDS: [PipelineKind; 5] = [
        PipelineKind::Receiver(Role::Bap),
        PipelineKind::Receiver(Role::Bpp),
        PipelineKind::MockCaller,
        PipelineKind::FormReceiver,
        PipelineKind::StandaloneValidator,
    ];

    fn params() -> ParameterSet {
        RawParameters::new("RET11", "2.0.0").resolve().unwrap()
    }

    // ── Templates ─────────────────────────────────────────────────────────────

    #[test]
    fn every_template_is_coherent() {
        for kind in ALL_KINDS {
            let handler = build_handler(&params(), kind);
            assert_eq!(handler.steps, kind.steps());
            handler
                .validate(&kind.to_string())
                .unwrap_or_else(|e| panic!("{kind}: {e}"));
        }
    }

    #[test]
    fn receiver_uses_own_role_and_validates_signatures() {
        let handler = build_handler(&params(), PipelineKind::Receiver(Role::Bpp));
        assert_eq!(handler.role, Role::Bpp);
        assert_eq!(handler.steps.len(), 7);
        assert_eq!(handler.steps.first(), Some(&Step::OndcWorkbenchReceiver));
        assert_eq!(handler.steps.last(), Some(&Step::ValidateOndcCallSave));
        assert!(handler.plugins.sign_validator.is_some());
        assert!(handler.plugins.signer.is_none());

        let wb = handler.plugins.ondc_workbench.as_ref().unwrap();
        assert_eq!(wb.config_value("moduleRole"), Some(&Value::String("BPP".into())));
        assert_eq!(
            wb.config_value("moduleType"),
            Some(&Value::String("receiver".into()))
        );
    }

    #[test]
    fn receiver_binds_network_peer_router_and_audit() {
        let handler = build_handler(&params(), PipelineKind::Receiver(Role::Bap));
        let router = handler.plugins.router.as_ref().unwrap();
        assert_eq!(
            router.config_value("routingConfig"),
            Some(&Value::String("./config/np_router.yaml".into()))
        );
        assert_eq!(handler.plugins.middleware.len(), 1);
        assert_eq!(
            handler.plugins.middleware[0].config_value("configPath"),
            Some(&Value::String("./config/np_no_config.yaml".into()))
        );
    }

    #[test]
    fn mock_caller_is_bpp_signs_and_uses_mock_bindings() {
        let handler = build_handler(&params(), PipelineKind::MockCaller);
        assert_eq!(handler.role, Role::Bpp);
        assert!(handler.plugins.signer.is_some());
        assert!(handler.plugins.sign_validator.is_none());
        assert!(!handler.steps.contains(&Step::ValidateOndcPayload));

        let wb = handler.plugins.ondc_workbench.as_ref().unwrap();
        assert_eq!(wb.config_value("moduleRole"), Some(&Value::String("BAP".into())));
        assert_eq!(
            wb.config_value("moduleType"),
            Some(&Value::String("caller".into()))
        );
        assert_eq!(
            handler.plugins.middleware[0].config_value("configPath"),
            Some(&Value::String("./config/mock_no_config.yaml".into()))
        );
    }

    #[test]
    fn form_receiver_only_routes() {
        let handler = build_handler(&params(), PipelineKind::FormReceiver);
        assert_eq!(handler.role, Role::Bap);
        assert_eq!(handler.steps, vec![Step::AddRoute]);
        assert_eq!(
            handler.plugins,
            PluginSet {
                router: handler.plugins.router.clone(),
                ..PluginSet::default()
            }
        );
    }

    #[test]
    fn standalone_validator_is_stateless() {
        let handler = build_handler(&params(), PipelineKind::StandaloneValidator);
        assert!(handler.plugins.router.is_none());
        assert!(handler.plugins.cache.is_none());
        let validator = handler.plugins.ondc_validator.as_ref().unwrap();
        assert_eq!(
            validator.config_value("stateFullValidations"),
            Some(&Value::Bool(false))
        );
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn step_without_plugin_is_rejected() {
        let mut handler = build_handler(&params(), PipelineKind::Receiver(Role::Bap));
        handler.plugins.sign_validator = None;
        assert_eq!(
            handler.validate("BapTxnReceiver"),
            Err(SynthError::MissingPlugin {
                module: "BapTxnReceiver".to_string(),
                step: "validateSign".to_string(),
                slot: "signValidator".to_string(),
            })
        );
    }

    #[test]
    fn reordered_steps_are_rejected() {
        let mut handler = build_handler(&params(), PipelineKind::Receiver(Role::Bap));
        handler.steps.swap(2, 3);
        assert!(matches!(
            handler.validate("BapTxnReceiver"),
            Err(SynthError::StepOrder { .. })
        ));
    }

    #[test]
    fn step_after_save_is_rejected() {
        let mut handler = build_handler(&params(), PipelineKind::MockCaller);
        handler.steps.push(Step::AddRoute);
        assert!(handler.validate("mockTxnCaller").is_err());
    }

    // ── Parsing ───────────────────────────────────────────────────────────────

    #[test]
    fn pipeline_kind_names_round_trip() {
        for kind in ALL_KINDS {
            assert_eq!(kind.to_string().parse::<PipelineKind>(), Ok(kind));
        }
        assert_eq!(
            "gateway".parse::<PipelineKind>(),
            Err(SynthError::UnknownPipeline("gateway".to_string()))
        );
    }

    #[test]
    fn steps_serialize_to_gateway_names() {
        let yaml = serde_yaml::to_string(&RECEIVER_STEPS.to_vec()).unwrap();
        let names: Vec<String> = serde_yaml::from_str(&yaml).unwrap();
        let expected: Vec<&str> = RECEIVER_STEPS.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, expected);
    }
}
