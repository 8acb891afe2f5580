//! `onixgen check` command implementation

use crate::CliError;
use crate::cli::OutputFormat;
use colored::Colorize;
use onixgen_core::parse_adapter;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub path: String,
    pub valid: bool,
    pub app_name: Option<String>,
    pub modules: Vec<String>,
    pub error: Option<String>,
}

/// Validate an adapter document on disk
pub fn run(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let report = build_report(path)?;

    match format {
        OutputFormat::Json => println!("{}", to_json(&report)?),
        OutputFormat::Text => print_report(&report),
    }

    if let Some(error) = &report.error {
        anyhow::bail!("adapter check failed: {error}");
    }
    Ok(())
}

fn build_report(path: &Path) -> Result<CheckReport, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut report = CheckReport {
        path: path.display().to_string(),
        valid: false,
        app_name: None,
        modules: Vec::new(),
        error: None,
    };

    let document = match parse_adapter(&text) {
        Ok(document) => document,
        Err(err) => {
            report.error = Some(err.to_string());
            return Ok(report);
        }
    };

    report.app_name = Some(document.app_name.clone());
    report.modules = document.modules.iter().map(|m| m.name.clone()).collect();
    match document.validate() {
        Ok(()) => report.valid = true,
        Err(err) => report.error = Some(err.to_string()),
    }
    Ok(report)
}

fn to_json(report: &CheckReport) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn print_report(report: &CheckReport) {
    println!("{} Checking {}", "→".green(), report.path);
    if let Some(app) = &report.app_name {
        println!("  app: {}", app.cyan());
    }
    for module in &report.modules {
        println!("  - {module}");
    }
    match &report.error {
        None => println!("{} Adapter document is valid", "✓".green()),
        Some(error) => println!("{} {}", "✗".red(), error),
    }
}
