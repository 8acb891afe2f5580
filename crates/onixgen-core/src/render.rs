//! Serializer: renders synthesized documents to YAML.
//!
//! Key order follows struct declaration order (and insertion order inside
//! plugin config blocks), so identical inputs always render to identical
//! text. [`synthesize`] is the single entry point that runs every builder,
//! validates the adapter document, and returns the six files.

use crate::audit::{audit_remap_for, AuditSink};
use crate::error::{SynthError, SynthResult};
use crate::params::ParameterSet;
use crate::registry::{build_adapter_document, AdapterDocument, Handlers};
use crate::routing::{build_routing_table, RouterKind, ACTION_CATALOG};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// File name of the adapter document.
pub const ADAPTER_FILE: &str = "adapter.yaml";

/// The six documents of a synthesis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigDocument {
    Adapter,
    Router(RouterKind),
    Audit(AuditSink),
}

impl ConfigDocument {
    pub const ALL: [ConfigDocument; 6] = [
        ConfigDocument::Adapter,
        ConfigDocument::Router(RouterKind::Form),
        ConfigDocument::Router(RouterKind::Mock),
        ConfigDocument::Router(RouterKind::NetworkPeer),
        ConfigDocument::Audit(AuditSink::Mock),
        ConfigDocument::Audit(AuditSink::NetworkPeer),
    ];

    /// Relative output path of this document.
    pub fn file_name(self) -> &'static str {
        match self {
            ConfigDocument::Adapter => ADAPTER_FILE,
            ConfigDocument::Router(router) => router.file_name(),
            ConfigDocument::Audit(sink) => sink.file_name(),
        }
    }
}

impl fmt::Display for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigDocument::Adapter => f.write_str("adapter"),
            ConfigDocument::Router(router) => write!(f, "{router}-router"),
            ConfigDocument::Audit(sink) => write!(f, "{sink}-audit"),
        }
    }
}

impl FromStr for ConfigDocument {
    type Err = SynthError;

    /// Accepts `adapter`, `<router>-router`, `<sink>-audit`, or a file name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(doc) = Self::ALL.into_iter().find(|d| d.file_name() == s) {
            return Ok(doc);
        }
        if s == "adapter" {
            return Ok(ConfigDocument::Adapter);
        }
        if let Some(router) = s.strip_suffix("-router") {
            return router.parse().map(ConfigDocument::Router);
        }
        if let Some(sink) = s.strip_suffix("-audit") {
            return sink.parse().map(ConfigDocument::Audit);
        }
        Err(SynthError::UnknownDocument(s.to_string()))
    }
}

/// Rendered output of a synthesis run: relative path to YAML text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedConfig {
    files: BTreeMap<String, String>,
}

impl RenderedConfig {
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.files
    }
}

/// Render any document to YAML.
pub fn to_yaml<T: Serialize>(doc: &T) -> SynthResult<String> {
    Ok(serde_yaml::to_string(doc)?)
}

/// Parse a previously rendered adapter document.
pub fn parse_adapter(text: &str) -> SynthResult<AdapterDocument> {
    Ok(serde_yaml::from_str(text)?)
}

/// Assemble and validate the adapter document for `params`.
pub fn adapter_document(params: &ParameterSet) -> SynthResult<AdapterDocument> {
    let doc = build_adapter_document(params, Handlers::assemble(params));
    doc.validate()?;
    Ok(doc)
}

/// Build and render a single document.
pub fn render_document(params: &ParameterSet, doc: ConfigDocument) -> SynthResult<String> {
    match doc {
        ConfigDocument::Adapter => to_yaml(&adapter_document(params)?),
        ConfigDocument::Router(router) => {
            to_yaml(&build_routing_table(params, router, &ACTION_CATALOG))
        }
        ConfigDocument::Audit(sink) => to_yaml(&audit_remap_for(params, sink)),
    }
}

/// Run every builder and render all six documents.
///
/// Fails without partial output if any document cannot be produced.
pub fn synthesize(params: &ParameterSet) -> SynthResult<RenderedConfig> {
    let files = ConfigDocument::ALL
        .into_iter()
        .map(|doc| Ok((doc.file_name().to_string(), render_document(params, doc)?)))
        .collect::<SynthResult<BTreeMap<_, _>>>()?;
    Ok(RenderedConfig { files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RawParameters;

    fn params() -> ParameterSet {
        RawParameters::new("RET11", "2.0.0").resolve().unwrap()
    }

    #[test]
    fn synthesize_produces_six_files() {
        let rendered = synthesize(&params()).unwrap();
        let names: Vec<&str> = rendered.iter().map(|(p, _)| p).collect();
        assert_eq!(
            names,
            vec![
                "adapter.yaml",
                "form_router.yaml",
                "mock_no_config.yaml",
                "mock_router.yaml",
                "np_no_config.yaml",
                "np_router.yaml",
            ]
        );
    }

    #[test]
    fn document_names_parse() {
        for doc in ConfigDocument::ALL {
            assert_eq!(doc.to_string().parse::<ConfigDocument>(), Ok(doc));
            assert_eq!(doc.file_name().parse::<ConfigDocument>(), Ok(doc));
        }
    }

    #[test]
    fn unknown_document_names_fail() {
        assert_eq!(
            "registry-router".parse::<ConfigDocument>(),
            Err(SynthError::UnknownRouter("registry".to_string()))
        );
        assert_eq!(
            "tracing-audit".parse::<ConfigDocument>(),
            Err(SynthError::UnknownAuditSink("tracing".to_string()))
        );
        assert_eq!(
            "compose".parse::<ConfigDocument>(),
            Err(SynthError::UnknownDocument("compose".to_string()))
        );
    }

    #[test]
    fn adapter_yaml_starts_with_app_name() {
        let text = render_document(&params(), ConfigDocument::Adapter).unwrap();
        assert!(text.starts_with("appName: workbench-onix-RET11-2.0.0\n"));
    }
}
