//! Gateway `.env` file rendering
//!
//! The gateway container reads its signing identity, registry URL and cache
//! credentials from a dotenv file written next to the adapter configuration.

use crate::config::DeploymentEnv;
use onixgen_core::ParameterSet;
use std::fmt::Write;

/// Render the gateway `.env` file. Values are always double-quoted; unset
/// variables render as empty strings.
pub fn render_env_file(env: &DeploymentEnv, params: &ParameterSet) -> String {
    let port = params.port().to_string();
    let service_name = params.service_name();
    let entries: [(&str, Option<&str>); 9] = [
        ("SUBSCRIBER_ID", env.subscriber_id.as_deref()),
        ("UNIQUE_KEY_ID", env.ukid.as_deref()),
        ("SIGNING_PRIVATE", env.sign_private_key.as_deref()),
        ("SIGNING_PUBLIC", env.sign_public_key.as_deref()),
        ("IN_HOUSE_URL", env.in_house_registry.as_deref()),
        ("REDIS_PASSWORD", env.redis_password.as_deref()),
        ("REDIS_USERNAME", env.redis_username.as_deref()),
        ("PORT", Some(port.as_str())),
        ("SERVICE_NAME", Some(service_name.as_str())),
    ];

    let mut out = String::new();
    for (key, value) in entries {
        let _ = writeln!(out, "{key}=\"{}\"", quote(value.unwrap_or_default()));
    }
    out
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use onixgen_core::RawParameters;

    fn params() -> ParameterSet {
        RawParameters::new("ONDC:RET11", "2.0.0")
            .with_port("8081")
            .resolve()
            .unwrap()
    }

    #[test]
    fn test_env_file_contains_derived_service_name_and_port() {
        let text = render_env_file(&DeploymentEnv::default(), &params());
        assert!(text.contains("PORT=\"8081\"\n"));
        assert!(text.contains("SERVICE_NAME=\"onix-ondc:ret11:2:0:0\"\n"));
        assert!(text.contains("SUBSCRIBER_ID=\"\"\n"));
        assert_eq!(text.lines().count(), 9);
    }

    #[test]
    fn test_env_file_maps_signing_variables() {
        let env = DeploymentEnv {
            ukid: Some("key-1".to_string()),
            sign_private_key: Some("priv\"ate".to_string()),
            ..DeploymentEnv::default()
        };
        let text = render_env_file(&env, &params());
        assert!(text.contains("UNIQUE_KEY_ID=\"key-1\"\n"));
        assert!(text.contains("SIGNING_PRIVATE=\"priv\\\"ate\"\n"));
    }
}
