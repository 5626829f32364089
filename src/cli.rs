//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `brokergen`.
#[derive(Debug, Parser)]
#[command(
    name = "brokergen",
    version,
    about = "Generate integration-broker modules and transforms from a legacy inventory"
)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate artifacts and the migration report.
    Generate {
        /// Inventory document (YAML or JSON).
        #[arg(long)]
        inventory: PathBuf,
        /// Hints document with aliases, defaults and enrichments.
        #[arg(long)]
        hints: PathBuf,
        /// Output directory (defaults to `$BROKERGEN_OUT` or `brokergen-out`).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Worker threads for per-component stages.
        #[arg(long, default_value_t = 1)]
        jobs: usize,
        /// Print artifact changes against the previous report in the output directory.
        #[arg(long)]
        diff: bool,
    },
    /// Classify an inventory without generating anything.
    Inspect {
        /// Inventory document (YAML or JSON).
        inventory: PathBuf,
    },
}
