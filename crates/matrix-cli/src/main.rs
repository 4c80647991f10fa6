//! Support-matrix update checker CLI
//!
//! Merges the version-check configuration tree against the support matrix,
//! fetches upstream versions and reports what is newer than the baseline.

mod cli;
mod commands;
mod error;
mod report;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command.unwrap_or_else(|| Commands::Check(Default::default())) {
        Commands::Check(args) => {
            commands::run_check(&cli.matrix, &cli.path, &args)?;
            Ok(())
        }
        Commands::Merge { json } => commands::run_merge(&cli.matrix, &cli.path, json),
    }
}

/// Log to stderr: `RUST_LOG` when set, otherwise INFO (DEBUG with `--verbose`).
fn init_tracing(verbose: bool) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_target(verbose);

    let result = if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        tracing::subscriber::set_global_default(builder.with_env_filter(EnvFilter::from_default_env()).finish())
    } else {
        let level = if verbose { Level::DEBUG } else { Level::INFO };
        tracing::subscriber::set_global_default(builder.with_max_level(level).finish())
    };
    result.map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {}", e)))?;

    tracing::debug!("Verbose mode enabled");
    Ok(())
}
