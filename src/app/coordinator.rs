//! Run orchestration
//!
//! The [`Coordinator`] drives a whole mirror run: bucket provisioning as a
//! sequential hard gate, task enumeration, the bounded download phase, a
//! full barrier, then the bounded upload phase over the surviving files.
//!
//! Per-task failures never cross the coordinator boundary; they are folded
//! into the [`MirrorSummary`] and visible only in logs. The provisioning
//! gate is the single fatal path.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::client::TaskFetcher;
use super::models::{enumerate_tasks, DownloadOutcome, UploadOutcome};
use super::pool::WorkerPool;
use super::provision;
use super::storage::ObjectStore;
use super::upload::Uploader;
use crate::config::Settings;
use crate::errors::Result;

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirrorSummary {
    /// Tasks enumerated from the configured catalog
    pub tasks: usize,
    /// Files downloaded successfully
    pub downloaded: usize,
    /// Tasks dropped after a failed download
    pub dropped: usize,
    /// Files uploaded and verified
    pub uploaded: usize,
    /// Files abandoned after exhausting upload retries
    pub gave_up: usize,
}

impl fmt::Display for MirrorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tasks, {} downloaded ({} dropped), {} uploaded ({} gave up)",
            self.tasks, self.downloaded, self.dropped, self.uploaded, self.gave_up
        )
    }
}

/// Drives a mirror run to completion
pub struct Coordinator {
    settings: Arc<Settings>,
    fetcher: Arc<dyn TaskFetcher>,
    store: Arc<dyn ObjectStore>,
    pool: WorkerPool,
}

impl Coordinator {
    /// Create a coordinator over the given components
    ///
    /// The same pool size serves both phases; the phases themselves never
    /// overlap.
    pub fn new(
        settings: Arc<Settings>,
        fetcher: Arc<dyn TaskFetcher>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        let pool = WorkerPool::new(settings.worker_count);
        Self {
            settings,
            fetcher,
            store,
            pool,
        }
    }

    /// Run provisioning, the download round, and the upload round
    ///
    /// # Errors
    ///
    /// Only bucket provisioning failures propagate; everything downstream is
    /// recovered per task and reported through the summary.
    pub async fn run(&self) -> Result<MirrorSummary> {
        // Hard gate: nothing runs until the bucket is ready
        provision::ensure_bucket(self.store.as_ref()).await?;

        let tasks = enumerate_tasks(
            &self.settings.kinds,
            &self.settings.years,
            &self.settings.months,
        );
        info!(
            "Enumerated {} replication tasks ({} workers)",
            tasks.len(),
            self.pool.worker_count()
        );
        let task_count = tasks.len();

        // Phase one: downloads. The pool joins fully before we move on.
        let download_bar = phase_bar(task_count as u64, "downloading");
        let outcomes = {
            let fetcher = Arc::clone(&self.fetcher);
            let bar = download_bar.clone();
            self.pool
                .run(tasks, move |task| {
                    let fetcher = Arc::clone(&fetcher);
                    let bar = bar.clone();
                    async move {
                        let outcome = fetcher.fetch(&task).await;
                        bar.inc(1);
                        outcome
                    }
                })
                .await
        };
        download_bar.finish_and_clear();

        // Dropped tasks never reach the uploader
        let local_paths: Vec<PathBuf> = outcomes
            .iter()
            .filter_map(|outcome| outcome.local_path.clone())
            .collect();
        let downloaded = local_paths.len();
        info!(
            "Download phase complete: {} of {} files",
            downloaded, task_count
        );

        // Phase two: uploads over the survivors
        let upload_bar = phase_bar(downloaded as u64, "uploading");
        let upload_outcomes = {
            let uploader = Arc::new(Uploader::new(
                Arc::clone(&self.store),
                self.settings.max_retries,
                self.settings.retry_backoff(),
            ));
            let bar = upload_bar.clone();
            self.pool
                .run(local_paths, move |path| {
                    let uploader = Arc::clone(&uploader);
                    let bar = bar.clone();
                    async move {
                        let outcome = uploader.upload(&path).await;
                        bar.inc(1);
                        outcome
                    }
                })
                .await
        };
        upload_bar.finish_and_clear();

        let summary = summarize(task_count, &outcomes, &upload_outcomes);
        info!("Done: all files processed ({})", summary);
        Ok(summary)
    }
}

fn summarize(
    task_count: usize,
    downloads: &[DownloadOutcome],
    uploads: &[UploadOutcome],
) -> MirrorSummary {
    let downloaded = downloads
        .iter()
        .filter(|outcome| outcome.local_path.is_some())
        .count();
    let uploaded = uploads.iter().filter(|outcome| outcome.succeeded).count();

    MirrorSummary {
        tasks: task_count,
        downloaded,
        dropped: task_count - downloaded,
        uploaded,
        gave_up: uploads.len() - uploaded,
    }
}

fn phase_bar(len: u64, label: &str) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message(label.to_string());
    bar
}
