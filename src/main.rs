//! tripdata mirror CLI application
//!
//! Command-line interface for mirroring NYC TLC trip-data release files
//! into an S3-compatible bucket. Features concurrent phase-barriered
//! transfers, upload verification, and bounded retry with fixed backoff.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use tripdata_mirror::cli::{handle_mirror, handle_plan, handle_provision, Cli, Commands};
use tripdata_mirror::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    init_logging(&cli);

    info!("tripdata mirror v{} starting", env!("CARGO_PKG_VERSION"));

    let config_file = cli.global.config.clone();
    match cli.command {
        Commands::Mirror(args) => {
            info!("Executing mirror command");
            handle_mirror(args, config_file).await
        }
        Commands::Provision => {
            info!("Executing provision command");
            handle_provision(config_file).await
        }
        Commands::Plan(args) => {
            info!("Executing plan command");
            handle_plan(args, config_file).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("tripdata_mirror={}", log_level).parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .init();
}
