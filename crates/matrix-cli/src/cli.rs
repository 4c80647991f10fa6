//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Support-matrix update checker - find newer upstream versions of the images in a product matrix
#[derive(Parser, Debug)]
#[command(name = "matrix-check")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Root of the support matrix (reference tree)
    #[arg(short, long, global = true, default_value = "./matrix")]
    pub matrix: PathBuf,

    /// Root of the version-check configuration tree
    #[arg(short, long, global = true, default_value = "./configs")]
    pub path: PathBuf,

    /// The command to run (defaults to `check`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Fetch upstream versions and write an update report
    ///
    /// Examples:
    ///   matrix-check check
    ///   matrix-check check -r out/report.md --include-unchanged
    Check(CheckArgs),

    /// Print the merged version-check configuration without fetching
    Merge {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

/// Arguments of the `check` command
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct CheckArgs {
    /// Where to write the Markdown report
    #[arg(short, long, default_value = "./report.md")]
    pub report: PathBuf,

    /// nvchecker executable to run
    #[arg(long, env = "NVCHECKER", default_value = "nvchecker")]
    pub nvchecker: PathBuf,

    /// Also report items whose upstream version is not newer
    #[arg(long)]
    pub include_unchanged: bool,
}

impl Default for CheckArgs {
    fn default() -> Self {
        Self {
            report: PathBuf::from("./report.md"),
            nvchecker: PathBuf::from("nvchecker"),
            include_unchanged: false,
        }
    }
}
