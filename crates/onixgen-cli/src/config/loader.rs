//! Build descriptor discovery and loading
//!
//! Supports YAML, JSON and TOML descriptors. `${VAR}` and `$VAR` references
//! are substituted from the environment before parsing.

use crate::CliError;
use config::{Config, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;

static BRACED_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static pattern"));

static SIMPLE_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)\b").expect("static pattern"));

/// The part of a build descriptor the synthesizer needs.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BuildDescriptor {
    pub info: BuildInfo,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BuildInfo {
    pub domain: String,
    pub version: String,
}

/// Detect descriptor format from file extension
pub fn detect_format(path: &Path) -> Result<FileFormat, CliError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| {
            CliError::ConfigError(format!("No file extension found: {}", path.display()))
        })?;

    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "json" => Ok(FileFormat::Json),
        "toml" => Ok(FileFormat::Toml),
        other => Err(CliError::ConfigError(format!(
            "Unsupported descriptor format: {other}"
        ))),
    }
}

/// Substitute environment variables in a string
///
/// Braced references are replaced first. Unset variables are left as-is.
pub fn substitute_env_vars(content: &str) -> String {
    substitute_with(content, |name| std::env::var(name).ok())
}

fn substitute_with(content: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let replace = |caps: &regex::Captures| lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string());
    let braced = BRACED_VAR.replace_all(content, &replace);
    SIMPLE_VAR.replace_all(&braced, &replace).into_owned()
}

/// Parse a descriptor from text in the given format
pub fn from_str(content: &str, format: FileFormat) -> Result<BuildDescriptor, CliError> {
    let substituted = substitute_env_vars(content);
    let config = Config::builder()
        .add_source(File::from_str(&substituted, format))
        .build()?;
    Ok(config.try_deserialize()?)
}

/// Load a descriptor from disk
pub fn load_descriptor(path: &Path) -> Result<BuildDescriptor, CliError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    from_str(&content, format).map_err(|e| {
        CliError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
    })
}
