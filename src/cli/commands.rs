//! Command handlers for the tripdata mirror CLI
//!
//! Wires parsed arguments and loaded settings into the core components and
//! runs the requested operation.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::app::{enumerate_tasks, Coordinator, S3Store, SourceClient};
use crate::config::{Settings, StoreCredentials};
use crate::errors::Result;

use super::args::{MirrorArgs, PlanArgs};

/// Handle the mirror command
///
/// Loads settings and credentials, provisions the bucket, and runs the
/// download and upload rounds. Partial failure is reported in logs only;
/// the handler returns `Ok` unless provisioning or configuration fails.
pub async fn handle_mirror(args: MirrorArgs, config_file: Option<PathBuf>) -> Result<()> {
    let mut settings = Settings::load(config_file).await?;
    args.apply(&mut settings);
    settings.validate()?;

    tokio::fs::create_dir_all(&settings.download_dir).await?;

    let credentials = StoreCredentials::load(&settings.credentials_file).await?;
    let store = Arc::new(S3Store::connect(&settings, &credentials).await);
    let fetcher = Arc::new(SourceClient::new(&settings)?);
    let settings = Arc::new(settings);

    let coordinator = Coordinator::new(settings, fetcher, store);
    let summary = coordinator.run().await?;

    println!("Done: all files processed ({summary}).");
    Ok(())
}

/// Handle the provision command
///
/// Runs only the idempotent bucket gate; useful for verifying credentials
/// and the bucket name before committing to a long transfer run.
pub async fn handle_provision(config_file: Option<PathBuf>) -> Result<()> {
    let settings = Settings::load(config_file).await?;
    let credentials = StoreCredentials::load(&settings.credentials_file).await?;
    let store = S3Store::connect(&settings, &credentials).await;

    crate::app::ensure_bucket(&store).await?;
    println!("Bucket '{}' is ready.", settings.bucket_name);
    Ok(())
}

/// Handle the plan command
///
/// Pure enumeration: prints the deterministic task list without touching
/// the network or the object store.
pub async fn handle_plan(args: PlanArgs, config_file: Option<PathBuf>) -> Result<()> {
    let settings = Settings::load(config_file).await?;
    let tasks = enumerate_tasks(&settings.kinds, &settings.years, &settings.months);

    info!("Catalog enumerates {} tasks", tasks.len());
    for task in &tasks {
        if args.urls {
            println!("{}", task.url(&settings.base_url));
        } else {
            println!("{}", task.file_name());
        }
    }
    println!("{} files total.", tasks.len());
    Ok(())
}
