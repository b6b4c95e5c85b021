//! Command-line argument parsing for tripdata mirror
//!
//! Defines the CLI structure using clap derive macros: global verbosity
//! flags plus the `mirror`, `provision`, and `plan` subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::models::DatasetKind;

/// tripdata mirror - replicate NYC TLC trip-data releases into object storage
#[derive(Parser, Debug)]
#[command(
    name = "tripdata_mirror",
    version,
    about = "Mirror NYC TLC trip-data release files into an S3-compatible bucket",
    long_about = "Downloads the configured catalog of trip-data release files and uploads \
each one into a managed object-store bucket, verifying every upload landed.
Downloads and uploads run in two phase-barriered rounds over a bounded worker pool."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full mirror: provision, download, upload, verify
    Mirror(MirrorArgs),

    /// Only ensure the destination bucket exists and is usable
    Provision,

    /// List the replication tasks the current configuration enumerates
    Plan(PlanArgs),
}

/// Arguments for the mirror command
#[derive(Args, Debug, Clone)]
pub struct MirrorArgs {
    /// Dataset kinds to mirror (defaults to the configured catalog)
    #[arg(short, long, value_delimiter = ',')]
    pub kinds: Vec<DatasetKind>,

    /// Years to mirror (defaults to the configured catalog)
    #[arg(short, long, value_delimiter = ',')]
    pub years: Vec<u16>,

    /// Number of concurrent workers for both phases
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Local download directory
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,
}

/// Arguments for the plan command
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Print source URLs instead of file names
    #[arg(long)]
    pub urls: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl MirrorArgs {
    /// Fold CLI overrides into loaded settings
    pub fn apply(&self, settings: &mut crate::config::Settings) {
        if !self.kinds.is_empty() {
            settings.kinds = self.kinds.clone();
        }
        if !self.years.is_empty() {
            settings.years = self.years.clone();
        }
        if let Some(workers) = self.workers {
            settings.worker_count = workers;
        }
        if let Some(ref dir) = self.download_dir {
            settings.download_dir = dir.clone();
        }
    }
}
