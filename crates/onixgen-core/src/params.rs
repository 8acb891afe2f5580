//! Parameter Set: the typed deployment input of a synthesis run.
//!
//! Values arrive as strings from whatever resolved the deployment
//! ([`RawParameters`]) and are checked once by [`RawParameters::resolve`].
//! Every builder in this crate takes the resulting [`ParameterSet`] (or the
//! fields it needs) explicitly; nothing downstream reads external state.
//!
//! Empty `domain`, `version` and service URLs are accepted and interpolated
//! verbatim. Only the network fields are checked, because a malformed port
//! or cache address yields a gateway that cannot start.

use crate::error::{SynthError, SynthResult};
use serde::{Deserialize, Serialize};

/// Port the gateway listens on when none is configured.
pub const DEFAULT_PORT: u16 = 8080;

/// Unvalidated deployment parameters, all as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParameters {
    /// Protocol domain, e.g. `ONDC:RET11`.
    pub domain: String,
    /// Protocol version, e.g. `2.0.0`.
    pub version: String,
    /// Listening port, decimal.
    pub port: String,
    /// Cache (Redis) address in `host:port` form.
    pub cache_address: String,
    /// Base URL of the workbench config service.
    pub config_service_url: String,
    /// Base URL of the mock server.
    pub mock_service_url: String,
    /// HTTP base URL of the recorder (audit) service.
    pub audit_http_url: String,
    /// gRPC target of the recorder (audit) service.
    pub audit_grpc_url: String,
}

impl Default for RawParameters {
    fn default() -> Self {
        Self {
            domain: String::new(),
            version: String::new(),
            port: DEFAULT_PORT.to_string(),
            cache_address: "localhost:6379".to_string(),
            config_service_url: String::new(),
            mock_service_url: String::new(),
            audit_http_url: String::new(),
            audit_grpc_url: String::new(),
        }
    }
}

impl RawParameters {
    /// Start from defaults with the given protocol domain and version.
    pub fn new(domain: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Builder: set the listening port.
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    /// Builder: set the cache address (`host:port`).
    pub fn with_cache_address(mut self, addr: impl Into<String>) -> Self {
        self.cache_address = addr.into();
        self
    }

    /// Builder: set the config service URL.
    pub fn with_config_service_url(mut self, url: impl Into<String>) -> Self {
        self.config_service_url = url.into();
        self
    }

    /// Builder: set the mock service URL.
    pub fn with_mock_service_url(mut self, url: impl Into<String>) -> Self {
        self.mock_service_url = url.into();
        self
    }

    /// Builder: set the recorder HTTP URL.
    pub fn with_audit_http_url(mut self, url: impl Into<String>) -> Self {
        self.audit_http_url = url.into();
        self
    }

    /// Builder: set the recorder gRPC target.
    pub fn with_audit_grpc_url(mut self, url: impl Into<String>) -> Self {
        self.audit_grpc_url = url.into();
        self
    }

    /// Check the raw values and produce an immutable [`ParameterSet`].
    ///
    /// Fails with [`SynthError::InvalidParameter`] naming the first offending
    /// field. Checks, in order:
    /// 1. `port` is a decimal integer in `1..=65535`.
    /// 2. `cacheAddress` is `host:port` with a non-empty host and a valid port.
    pub fn resolve(&self) -> SynthResult<ParameterSet> {
        let port = parse_port("port", &self.port)?;
        let cache_address = self.cache_address.trim();
        let (host, cache_port) = cache_address.rsplit_once(':').ok_or_else(|| {
            SynthError::invalid(
                "cacheAddress",
                format!("expected host:port, got '{cache_address}'"),
            )
        })?;
        if host.trim().is_empty() {
            return Err(SynthError::invalid("cacheAddress", "host is empty"));
        }
        parse_port("cacheAddress", cache_port)?;

        Ok(ParameterSet {
            domain: self.domain.clone(),
            version: self.version.clone(),
            port,
            cache_address: cache_address.to_string(),
            config_service_url: self.config_service_url.clone(),
            mock_service_url: self.mock_service_url.clone(),
            audit_http_url: self.audit_http_url.clone(),
            audit_grpc_url: self.audit_grpc_url.clone(),
        })
    }
}

fn parse_port(field: &'static str, raw: &str) -> SynthResult<u16> {
    let raw = raw.trim();
    match raw.parse::<u16>() {
        Ok(0) => Err(SynthError::invalid(field, "port must be greater than 0")),
        Ok(port) => Ok(port),
        Err(_) => Err(SynthError::invalid(
            field,
            format!("'{raw}' is not a port number"),
        )),
    }
}

/// Resolved, immutable deployment parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSet {
    domain: String,
    version: String,
    port: u16,
    cache_address: String,
    config_service_url: String,
    mock_service_url: String,
    audit_http_url: String,
    audit_grpc_url: String,
}

impl ParameterSet {
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn cache_address(&self) -> &str {
        &self.cache_address
    }

    pub fn config_service_url(&self) -> &str {
        &self.config_service_url
    }

    pub fn mock_service_url(&self) -> &str {
        &self.mock_service_url
    }

    pub fn audit_http_url(&self) -> &str {
        &self.audit_http_url
    }

    pub fn audit_grpc_url(&self) -> &str {
        &self.audit_grpc_url
    }

    /// Deployment identifier of the generated adapter.
    pub fn app_name(&self) -> String {
        format!("workbench-onix-{}-{}", self.domain, self.version)
    }

    /// Service name advertised by the gateway container.
    ///
    /// `onix-<domain>:<version>` with every `.` turned into `:`, lower-cased.
    pub fn service_name(&self) -> String {
        format!("onix-{}:{}", self.domain, self.version)
            .replace('.', ":")
            .to_lowercase()
    }

    /// Directory segment under which generated schemas for this deployment
    /// are placed: `<domain>/v<version>`, domain lower-cased with its
    /// namespace separator turned into `_`.
    pub fn schema_segment(&self) -> String {
        format!(
            "{}/v{}",
            self.domain.to_lowercase().replacen(':', "_", 1),
            self.version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawParameters {
        RawParameters::new("ONDC:RET11", "2.0.0")
            .with_port("8080")
            .with_cache_address("localhost:6379")
    }

    // ── Happy path ────────────────────────────────────────────────────────────

    #[test]
    fn resolves_valid_parameters() {
        let params = raw().resolve().unwrap();
        assert_eq!(params.domain(), "ONDC:RET11");
        assert_eq!(params.version(), "2.0.0");
        assert_eq!(params.port(), 8080);
        assert_eq!(params.cache_address(), "localhost:6379");
    }

    #[test]
    fn port_and_cache_address_are_trimmed() {
        let params = raw()
            .with_port(" 9000 ")
            .with_cache_address(" redis:6380\n")
            .resolve()
            .unwrap();
        assert_eq!(params.port(), 9000);
        assert_eq!(params.cache_address(), "redis:6380");
    }

    #[test]
    fn empty_domain_and_version_are_accepted() {
        let params = RawParameters::new("", "").resolve().unwrap();
        assert_eq!(params.domain(), "");
        assert_eq!(params.app_name(), "workbench-onix--");
    }

    #[test]
    fn defaults_match_the_stock_deployment() {
        let params = RawParameters::default().resolve().unwrap();
        assert_eq!(params.port(), DEFAULT_PORT);
        assert_eq!(params.cache_address(), "localhost:6379");
        assert_eq!(params.config_service_url(), "");
    }

    // ── Invalid parameters ────────────────────────────────────────────────────

    #[test]
    fn non_numeric_port_names_the_field() {
        let err = raw().with_port("http").resolve().unwrap_err();
        assert!(matches!(err, SynthError::InvalidParameter { field: "port", .. }));
    }

    #[test]
    fn zero_port_is_rejected() {
        let err = raw().with_port("0").resolve().unwrap_err();
        assert!(matches!(err, SynthError::InvalidParameter { field: "port", .. }));
    }

    #[test]
    fn out_of_range_port_is_rejected() {
        assert!(raw().with_port("70000").resolve().is_err());
    }

    #[test]
    fn cache_address_without_port_is_rejected() {
        let err = raw().with_cache_address("localhost").resolve().unwrap_err();
        assert!(matches!(
            err,
            SynthError::InvalidParameter { field: "cacheAddress", .. }
        ));
    }

    #[test]
    fn cache_address_without_host_is_rejected() {
        let err = raw().with_cache_address(":6379").resolve().unwrap_err();
        assert!(matches!(
            err,
            SynthError::InvalidParameter { field: "cacheAddress", .. }
        ));
    }

    #[test]
    fn cache_address_with_bad_port_is_rejected() {
        let err = raw().with_cache_address("redis:abc").resolve().unwrap_err();
        assert!(matches!(
            err,
            SynthError::InvalidParameter { field: "cacheAddress", .. }
        ));
    }

    // ── Derived names ─────────────────────────────────────────────────────────

    #[test]
    fn app_name_embeds_domain_and_version() {
        assert_eq!(
            raw().resolve().unwrap().app_name(),
            "workbench-onix-ONDC:RET11-2.0.0"
        );
    }

    #[test]
    fn service_name_replaces_dots_and_lowercases() {
        assert_eq!(
            raw().resolve().unwrap().service_name(),
            "onix-ondc:ret11:2:0:0"
        );
    }

    #[test]
    fn schema_segment_uses_lowercase_domain() {
        assert_eq!(
            raw().resolve().unwrap().schema_segment(),
            "ondc_ret11/v2.0.0"
        );
    }
}
