//! `onixgen render` command implementation

use crate::cli::InputArgs;
use crate::config::{DeploymentEnv, resolve_parameters};
use onixgen_core::{ConfigDocument, render_document};

/// Print one synthesized document to stdout
pub fn run(document: &str, inputs: &InputArgs) -> anyhow::Result<()> {
    let document: ConfigDocument = document.parse()?;
    let env = DeploymentEnv::from_process()?;
    let params = resolve_parameters(inputs, &env)?;

    tracing::debug!(%document, file = document.file_name(), "rendering document");
    print!("{}", render_document(&params, document)?);
    Ok(())
}
