//! Audit Remap Builder.
//!
//! The network observability middleware ships one event per call to the
//! recorder service. An [`AuditRemap`] tells it how to project the live
//! request/response context into that event. Values starting with `$.` are
//! paths evaluated by the gateway at runtime; they are emitted verbatim.
//!
//! The mock sink and the network-peer sink documents differ only in
//! `is_mock`.

use crate::error::SynthError;
use crate::params::ParameterSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// gRPC method the recorder exposes for audit events.
pub const AUDIT_GRPC_METHOD: &str = "/beckn.audit.v1.AuditService/LogEvent";

/// Per-call deadline for the audit RPC.
pub const AUDIT_TIMEOUT_MS: u64 = 5000;

/// Marker the middleware replaces with a fresh identifier per event.
pub const FRESH_ID_MARKER: &str = "uuid()";

/// Audit sink a remap document feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditSink {
    /// Calls made by the mock caller.
    Mock,
    /// Calls received from network peers.
    NetworkPeer,
}

impl AuditSink {
    pub const ALL: [AuditSink; 2] = [AuditSink::Mock, AuditSink::NetworkPeer];

    /// File name of this sink's document under the config root.
    pub fn file_name(self) -> &'static str {
        match self {
            AuditSink::Mock => "mock_no_config.yaml",
            AuditSink::NetworkPeer => "np_no_config.yaml",
        }
    }

    pub fn is_mock(self) -> bool {
        matches!(self, AuditSink::Mock)
    }
}

impl fmt::Display for AuditSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuditSink::Mock => "mock",
            AuditSink::NetworkPeer => "np",
        })
    }
}

impl FromStr for AuditSink {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mock" => Ok(AuditSink::Mock),
            "np" | "network-peer" => Ok(AuditSink::NetworkPeer),
            other => Err(SynthError::UnknownAuditSink(other.to_string())),
        }
    }
}

/// Transport the middleware uses to reach the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditTransport {
    Grpc,
}

/// Field projection from gateway context to audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapFields {
    pub payload_id: String,
    pub transaction_id: String,
    pub message_id: String,
    pub subscriber_url: String,
    pub action: String,
    pub timestamp: String,
    pub api_name: String,
    pub status_code: String,
    pub ttl_seconds: String,
    pub cache_ttl_seconds: u64,
    pub is_mock: bool,
    pub session_id: String,
    pub req_headers: String,
}

impl RemapFields {
    fn for_sink(sink: AuditSink) -> Self {
        Self {
            payload_id: FRESH_ID_MARKER.to_string(),
            transaction_id: "$.requestBody.context.transaction_id".to_string(),
            message_id: "$.requestBody.context.message_id".to_string(),
            subscriber_url: "$.ctx.cookies.subscriber_url".to_string(),
            action: "$.requestBody.context.action".to_string(),
            timestamp: "$.requestBody.context.timestamp".to_string(),
            api_name: "$.requestBody.context.action".to_string(),
            status_code: "$.ctx.status".to_string(),
            ttl_seconds: "$.ctx.cookies.ttl_seconds".to_string(),
            cache_ttl_seconds: 0,
            is_mock: sink.is_mock(),
            session_id: "$.ctx.cookies.session_id".to_string(),
            req_headers: "$.ctx.headers_all".to_string(),
        }
    }
}

/// An audit remap document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRemap {
    pub transport: AuditTransport,
    pub grpc_target: String,
    pub grpc_insecure: bool,
    pub grpc_method: String,
    pub grpc_timeout_ms: u64,
    #[serde(rename = "async")]
    pub is_async: bool,
    pub remap: RemapFields,
}

/// Build the remap document for `sink`, shipping events to `grpc_target`.
pub fn build_audit_remap(grpc_target: &str, sink: AuditSink) -> AuditRemap {
    AuditRemap {
        transport: AuditTransport::Grpc,
        grpc_target: grpc_target.to_string(),
        grpc_insecure: true,
        grpc_method: AUDIT_GRPC_METHOD.to_string(),
        grpc_timeout_ms: AUDIT_TIMEOUT_MS,
        is_async: false,
        remap: RemapFields::for_sink(sink),
    }
}

/// [`build_audit_remap`] against the recorder configured in `params`.
pub fn audit_remap_for(params: &ParameterSet, sink: AuditSink) -> AuditRemap {
    build_audit_remap(params.audit_grpc_url(), sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sinks_differ_only_in_is_mock() {
        let mock = build_audit_remap("audit-grpc:9000", AuditSink::Mock);
        let mut np = build_audit_remap("audit-grpc:9000", AuditSink::NetworkPeer);
        assert!(mock.remap.is_mock);
        assert!(!np.remap.is_mock);

        np.remap.is_mock = true;
        assert_eq!(mock, np);
    }

    #[test]
    fn remap_carries_correlation_id_and_fresh_payload_marker() {
        let doc = build_audit_remap("audit-grpc:9000", AuditSink::Mock);
        assert_eq!(doc.remap.transaction_id, "$.requestBody.context.transaction_id");
        assert_eq!(doc.remap.payload_id, "uuid()");
        assert_eq!(doc.grpc_target, "audit-grpc:9000");
        assert_eq!(doc.grpc_timeout_ms, 5000);
        assert!(doc.grpc_insecure);
        assert!(!doc.is_async);
    }

    #[test]
    fn serialized_keys_match_the_middleware_schema() {
        let yaml = serde_yaml::to_string(&build_audit_remap("t:1", AuditSink::NetworkPeer)).unwrap();
        assert!(yaml.starts_with("transport: grpc\n"));
        assert!(yaml.contains("async: false"));
        assert!(yaml.contains("is_mock: false"));
        assert!(yaml.contains("cache_ttl_seconds: 0"));
    }

    #[test]
    fn unknown_sink_fails() {
        assert_eq!(
            "registry".parse::<AuditSink>(),
            Err(SynthError::UnknownAuditSink("registry".to_string()))
        );
    }
}
