//! Routing Table Builder.
//!
//! Each logical router of the adapter gets its own routing document holding
//! exactly one [`RoutingRule`]. The form router forwards to a literal URL;
//! the mock and network-peer routers forward to a URL carried in a request
//! cookie, resolved by the gateway at request time.

use crate::error::SynthError;
use crate::params::ParameterSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Request/response action pairs the transaction routers apply to.
pub const ACTION_CATALOG: [&str; 18] = [
    "search",
    "on_search",
    "select",
    "on_select",
    "init",
    "on_init",
    "confirm",
    "on_confirm",
    "status",
    "on_status",
    "update",
    "on_update",
    "cancel",
    "on_cancel",
    "track",
    "on_track",
    "issue",
    "on_issue",
];

/// Endpoint name the form router serves.
pub const FORM_ENDPOINT: &str = "html-form";

// ─────────────────────────────────────────────────────────────────────────────
// Router identity
// ─────────────────────────────────────────────────────────────────────────────

/// The three routers an adapter document references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterKind {
    /// Forwards HTML form submissions to the recorder service.
    Form,
    /// Routes mock-caller traffic to the subscriber under test.
    Mock,
    /// Routes traffic from network peers to the mock server.
    NetworkPeer,
}

impl RouterKind {
    pub const ALL: [RouterKind; 3] = [RouterKind::Form, RouterKind::Mock, RouterKind::NetworkPeer];

    /// File name of this router's document under the config root.
    pub fn file_name(self) -> &'static str {
        match self {
            RouterKind::Form => "form_router.yaml",
            RouterKind::Mock => "mock_router.yaml",
            RouterKind::NetworkPeer => "np_router.yaml",
        }
    }
}

impl fmt::Display for RouterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RouterKind::Form => "form",
            RouterKind::Mock => "mock",
            RouterKind::NetworkPeer => "np",
        })
    }
}

impl FromStr for RouterKind {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "form" => Ok(RouterKind::Form),
            "mock" => Ok(RouterKind::Mock),
            "np" | "network-peer" => Ok(RouterKind::NetworkPeer),
            other => Err(SynthError::UnknownRouter(other.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Routing documents
// ─────────────────────────────────────────────────────────────────────────────

/// Where a matched request is forwarded.
///
/// Serializes as the `targetType` discriminator plus the `target` block, so
/// a rule can never carry both a literal URL and a JSON path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "targetType", content = "target")]
pub enum RouteTarget {
    /// Literal URL.
    #[serde(rename = "url")]
    Url {
        url: String,
        /// Forward to `url` as-is instead of appending the action name.
        #[serde(rename = "excludeAction")]
        exclude_action: bool,
    },
    /// URL read from the request context at gateway runtime.
    #[serde(rename = "jsonPath")]
    JsonPath {
        #[serde(rename = "jsonPath")]
        json_path: String,
    },
}

/// One forwarding rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingRule {
    pub domain: String,
    pub version: String,
    #[serde(flatten)]
    pub target: RouteTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub act_as_proxy: Option<bool>,
    /// Actions (or endpoint names) the rule applies to.
    pub endpoints: Vec<String>,
}

/// A routing document: the `routingRules` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingTable {
    pub routing_rules: Vec<RoutingRule>,
}

/// Build the routing document for `router`.
///
/// `actions` is the catalog applied by the transaction routers; pass
/// [`ACTION_CATALOG`] for the stock deployment.
pub fn build_routing_table(
    params: &ParameterSet,
    router: RouterKind,
    actions: &[&str],
) -> RoutingTable {
    let catalog = || actions.iter().map(|a| a.to_string()).collect::<Vec<_>>();
    let make_rule =
        |target: RouteTarget, act_as_proxy: Option<bool>, endpoints: Vec<String>| RoutingRule {
            domain: params.domain().to_string(),
            version: params.version().to_string(),
            target,
            act_as_proxy,
            endpoints,
        };

    let rule = match router {
        RouterKind::Form => make_rule(
            RouteTarget::Url {
                url: format!("{}/{FORM_ENDPOINT}", params.audit_http_url()),
                exclude_action: true,
            },
            None,
            vec![FORM_ENDPOINT.to_string()],
        ),
        RouterKind::Mock => make_rule(
            RouteTarget::JsonPath {
                json_path: "$.cookies.subscriber_url".to_string(),
            },
            Some(true),
            catalog(),
        ),
        RouterKind::NetworkPeer => make_rule(
            RouteTarget::JsonPath {
                json_path: "$.cookies.mock_url".to_string(),
            },
            Some(false),
            catalog(),
        ),
    };

    RoutingTable {
        routing_rules: vec![rule],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RawParameters;

    fn params() -> ParameterSet {
        RawParameters::new("RET11", "2.0.0")
            .with_audit_http_url("http://audit-http")
            .resolve()
            .unwrap()
    }

    fn only_rule(router: RouterKind) -> RoutingRule {
        let mut table = build_routing_table(&params(), router, &ACTION_CATALOG);
        assert_eq!(table.routing_rules.len(), 1);
        table.routing_rules.remove(0)
    }

    #[test]
    fn catalog_holds_nine_request_response_pairs() {
        assert_eq!(ACTION_CATALOG.len(), 18);
        for pair in ACTION_CATALOG.chunks(2) {
            assert_eq!(pair[1], format!("on_{}", pair[0]));
        }
    }

    #[test]
    fn form_router_targets_recorder_form_endpoint() {
        let rule = only_rule(RouterKind::Form);
        assert_eq!(
            rule.target,
            RouteTarget::Url {
                url: "http://audit-http/html-form".to_string(),
                exclude_action: true,
            }
        );
        assert_eq!(rule.act_as_proxy, None);
        assert_eq!(rule.endpoints, vec!["html-form".to_string()]);
    }

    #[test]
    fn mock_router_reads_subscriber_cookie_and_proxies() {
        let rule = only_rule(RouterKind::Mock);
        assert_eq!(
            rule.target,
            RouteTarget::JsonPath {
                json_path: "$.cookies.subscriber_url".to_string()
            }
        );
        assert_eq!(rule.act_as_proxy, Some(true));
        assert_eq!(rule.endpoints.len(), 18);
    }

    #[test]
    fn np_router_reads_mock_cookie_without_proxying() {
        let rule = only_rule(RouterKind::NetworkPeer);
        assert_eq!(
            rule.target,
            RouteTarget::JsonPath {
                json_path: "$.cookies.mock_url".to_string()
            }
        );
        assert_eq!(rule.act_as_proxy, Some(false));
        assert_eq!(rule.domain, "RET11");
        assert_eq!(rule.version, "2.0.0");
    }

    #[test]
    fn rules_serialize_with_target_type_discriminator() {
        let yaml = serde_yaml::to_string(&only_rule(RouterKind::Mock)).unwrap();
        assert!(yaml.contains("targetType: jsonPath"));
        assert!(yaml.contains("$.cookies.subscriber_url"));
        assert!(!yaml.contains("excludeAction"));
    }

    #[test]
    fn unknown_router_kind_fails() {
        assert_eq!(
            "registry".parse::<RouterKind>(),
            Err(SynthError::UnknownRouter("registry".to_string()))
        );
        assert_eq!("np".parse::<RouterKind>(), Ok(RouterKind::NetworkPeer));
    }
}
