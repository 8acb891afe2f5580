//! `onixgen generate` command implementation

use crate::CliError;
use crate::cli::InputArgs;
use crate::config::{DeploymentEnv, resolve_parameters};
use crate::env_file::render_env_file;
use colored::Colorize;
use onixgen_core::synthesize;
use std::fs;
use std::path::Path;

/// Synthesize every adapter document and write them under `output`
pub fn run(inputs: &InputArgs, output: &Path, env_file: Option<&Path>) -> anyhow::Result<()> {
    let env = DeploymentEnv::from_process()?;
    let params = resolve_parameters(inputs, &env)?;

    println!(
        "{} Generating gateway config for {} {}",
        "→".green(),
        params.domain().cyan(),
        params.version().cyan()
    );

    let rendered = synthesize(&params)?;
    tracing::info!(
        app = %params.app_name(),
        schema_dir = %params.schema_segment(),
        documents = rendered.len(),
        "synthesized adapter configuration"
    );

    for (name, text) in rendered.iter() {
        let path = output.join(name);
        write_file(&path, text)?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "wrote document");
        println!("  {} {}", "+".green(), path.display());
    }

    if let Some(path) = env_file {
        write_file(path, &render_env_file(&env, &params))?;
        println!("  {} {}", "+".green(), path.display());
    }

    println!(
        "{} Wrote {} documents to {}",
        "✓".green(),
        rendered.len(),
        output.display()
    );
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| CliError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}
