//! onixgen - writes ONIX gateway adapter configuration for a protocol domain

mod cli;
mod commands;
mod config;
mod env_file;
mod error;

pub use error::CliError;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over the verbosity flag
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            inputs,
            output,
            env_file,
        } => {
            commands::generate::run(&inputs, &output, env_file.as_deref())?;
        }

        Commands::Render { document, inputs } => {
            commands::render::run(&document, &inputs)?;
        }

        Commands::Check { path, format } => {
            commands::check::run(&path, format)?;
        }
    }

    Ok(())
}
