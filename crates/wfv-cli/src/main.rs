//! # wfv CLI Entry Point
//!
//! Parses command-line arguments, loads configuration, and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wfv_cli::schemas::{run_schemas, run_versions, SchemasArgs};
use wfv_cli::validate::{run_validate, ValidateArgs};

/// Validate workflow files against the schema version they declare.
#[derive(Parser, Debug)]
#[command(name = "wfv", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (default: ./wfv.yaml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a workflow file.
    Validate(ValidateArgs),

    /// Print the schema set for a version as JSON.
    Schemas(SchemasArgs),

    /// List supported schema versions.
    Versions,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG controls verbosity; warnings and errors by default.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = wfv_cli::load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Validate(args) => run_validate(&args, &config),
        Commands::Schemas(args) => run_schemas(&args, &wfv_cli::build_dispatcher(&config)?),
        Commands::Versions => run_versions(&wfv_cli::build_dispatcher(&config)?),
    }
}
