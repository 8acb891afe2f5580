//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// onixgen - synthesize ONIX gateway adapter configuration
#[derive(Parser)]
#[command(name = "onixgen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Synthesize all adapter documents and write them to a directory
    Generate {
        #[command(flatten)]
        inputs: InputArgs,

        /// Directory the documents are written to
        #[arg(short, long, default_value = "build-output/temp/config")]
        output: PathBuf,

        /// Also write the gateway .env file to this path
        #[arg(long)]
        env_file: Option<PathBuf>,
    },

    /// Print a single document to stdout
    Render {
        /// Document: adapter, form-router, mock-router, np-router, mock-audit, np-audit
        document: String,

        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Validate an existing adapter document
    Check {
        /// Path to adapter.yaml
        path: PathBuf,

        /// Report format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Where the protocol domain and version come from.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Build descriptor holding info.domain and info.version
    #[arg(short, long, env = "ONIXGEN_BUILD")]
    pub build: Option<PathBuf>,

    /// Protocol domain (overrides the build descriptor)
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Protocol version (overrides the build descriptor)
    #[arg(short = 'p', long)]
    pub protocol_version: Option<String>,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for automation
    Json,
}
