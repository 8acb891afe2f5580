//! Parameter resolution
//!
//! Combines the build descriptor, command-line overrides and the deployment
//! environment into the synthesizer's [`RawParameters`].

pub mod loader;

pub use loader::{BuildDescriptor, load_descriptor};

use crate::CliError;
use crate::cli::InputArgs;
use config::{Config, Environment};
use onixgen_core::{ParameterSet, RawParameters};
use serde::Deserialize;

/// Deployment variables read from the process environment.
///
/// Names are the unprefixed variables the gateway deployment already uses
/// (`PORT`, `REDIS_HOST`, ...). Missing variables fall back to the stock
/// deployment defaults when building parameters.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeploymentEnv {
    #[serde(alias = "PORT")]
    pub port: Option<String>,
    #[serde(alias = "REDIS_HOST")]
    pub redis_host: Option<String>,
    #[serde(alias = "REDIS_PORT")]
    pub redis_port: Option<String>,
    #[serde(alias = "REDIS_USERNAME")]
    pub redis_username: Option<String>,
    #[serde(alias = "REDIS_PASSWORD")]
    pub redis_password: Option<String>,
    #[serde(alias = "CONFIG_SERVICE_URL")]
    pub config_service_url: Option<String>,
    #[serde(alias = "MOCK_SERVER_URL")]
    pub mock_server_url: Option<String>,
    #[serde(alias = "RECORDER_SERVICE_HTTP_URL")]
    pub recorder_service_http_url: Option<String>,
    #[serde(alias = "RECORDER_SERVICE_GRPC_URL")]
    pub recorder_service_grpc_url: Option<String>,
    #[serde(alias = "SUBSCRIBER_ID")]
    pub subscriber_id: Option<String>,
    #[serde(alias = "UKID")]
    pub ukid: Option<String>,
    #[serde(alias = "SIGN_PRIVATE_KEY")]
    pub sign_private_key: Option<String>,
    #[serde(alias = "SIGN_PUBLIC_KEY")]
    pub sign_public_key: Option<String>,
    #[serde(alias = "IN_HOUSE_REGISTRY")]
    pub in_house_registry: Option<String>,
}

impl DeploymentEnv {
    /// Read the current process environment
    pub fn from_process() -> Result<Self, CliError> {
        Self::from_source(None)
    }

    /// Read from an explicit variable map instead of the process environment
    pub fn from_source(source: Option<config::Map<String, String>>) -> Result<Self, CliError> {
        let config = Config::builder()
            .add_source(Environment::default().source(source))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Raw synthesizer input for the given protocol domain and version
    pub fn raw_parameters(&self, domain: &str, version: &str) -> RawParameters {
        let defaults = RawParameters::default();
        let or_empty = |v: &Option<String>| v.clone().unwrap_or_default();

        RawParameters {
            domain: domain.to_string(),
            version: version.to_string(),
            port: self.port.clone().unwrap_or(defaults.port),
            cache_address: format!(
                "{}:{}",
                self.redis_host.as_deref().unwrap_or("localhost"),
                self.redis_port.as_deref().unwrap_or("6379")
            ),
            config_service_url: or_empty(&self.config_service_url),
            mock_service_url: or_empty(&self.mock_server_url),
            audit_http_url: or_empty(&self.recorder_service_http_url),
            audit_grpc_url: or_empty(&self.recorder_service_grpc_url),
        }
    }
}

/// Resolve the Parameter Set from command-line inputs and `env`.
///
/// Flags win over the build descriptor. Both domain and version must come
/// from one of them; an empty value is accepted.
pub fn resolve_parameters(
    inputs: &InputArgs,
    env: &DeploymentEnv,
) -> Result<ParameterSet, CliError> {
    let descriptor = inputs.build.as_deref().map(load_descriptor).transpose()?;
    let info = descriptor.map(|d| d.info);

    let domain = inputs
        .domain
        .clone()
        .or_else(|| info.as_ref().map(|i| i.domain.clone()))
        .ok_or_else(|| {
            CliError::ConfigError("No protocol domain: pass --domain or --build".to_string())
        })?;
    let version = inputs
        .protocol_version
        .clone()
        .or_else(|| info.as_ref().map(|i| i.version.clone()))
        .ok_or_else(|| {
            CliError::ConfigError(
                "No protocol version: pass --protocol-version or --build".to_string(),
            )
        })?;

    let raw = env.raw_parameters(&domain, &version);
    tracing::debug!(?raw, "resolved raw parameters");
    Ok(raw.resolve()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> DeploymentEnv {
        let mut map = config::Map::new();
        for (k, v) in pairs {
            map.insert(k.to_string(), v.to_string());
        }
        DeploymentEnv::from_source(Some(map)).unwrap()
    }

    #[test]
    fn test_env_defaults_match_stock_deployment() {
        let raw = env_from(&[]).raw_parameters("RET11", "2.0.0");
        assert_eq!(raw.port, "8080");
        assert_eq!(raw.cache_address, "localhost:6379");
        assert_eq!(raw.audit_grpc_url, "");
    }

    #[test]
    fn test_env_variables_are_mapped() {
        let env = env_from(&[
            ("PORT", "9090"),
            ("REDIS_HOST", "redis"),
            ("REDIS_PORT", "6380"),
            ("MOCK_SERVER_URL", "http://mock"),
            ("RECORDER_SERVICE_GRPC_URL", "recorder:9000"),
        ]);
        let raw = env.raw_parameters("RET11", "2.0.0");
        assert_eq!(raw.port, "9090");
        assert_eq!(raw.cache_address, "redis:6380");
        assert_eq!(raw.mock_service_url, "http://mock");
        assert_eq!(raw.audit_grpc_url, "recorder:9000");
    }

    #[test]
    fn test_flags_are_enough_without_descriptor() {
        let inputs = InputArgs {
            build: None,
            domain: Some("RET11".to_string()),
            protocol_version: Some("2.0.0".to_string()),
        };
        let params = resolve_parameters(&inputs, &env_from(&[])).unwrap();
        assert_eq!(params.domain(), "RET11");
        assert_eq!(params.port(), 8080);
    }

    #[test]
    fn test_missing_domain_is_reported() {
        let inputs = InputArgs {
            protocol_version: Some("2.0.0".to_string()),
            ..InputArgs::default()
        };
        let err = resolve_parameters(&inputs, &env_from(&[])).unwrap_err();
        assert!(err.to_string().contains("--domain"));
    }

    #[test]
    fn test_non_numeric_port_fails_resolution() {
        let inputs = InputArgs {
            build: None,
            domain: Some("RET11".to_string()),
            protocol_version: Some("2.0.0".to_string()),
        };
        let err = resolve_parameters(&inputs, &env_from(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, CliError::Synth(_)));
    }
}
