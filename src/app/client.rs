//! HTTP source client and download operations
//!
//! This module fetches release files from the public HTTP endpoint and
//! streams them to local storage. Requests are rate limited and the client
//! is shared across all workers.
//!
//! Downloads are deliberately single-attempt: a failed fetch logs and drops
//! the task for the rest of the run, while uploads get a bounded retry loop.
//! That asymmetry is inherited from the system this mirrors and is pinned by
//! tests rather than smoothed over.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::models::{DownloadOutcome, ReplicationTask};
use crate::config::Settings;
use crate::constants::http;
use crate::errors::{DownloadError, DownloadResult};

/// Seam between the coordinator and the concrete HTTP client
///
/// Lets orchestration tests substitute scripted fetch results for real
/// network calls.
#[async_trait]
pub trait TaskFetcher: Send + Sync {
    /// Fetch one task's remote file to local storage
    ///
    /// Infallible by contract: failures are folded into the outcome as a
    /// dropped task, never surfaced as errors.
    async fn fetch(&self, task: &ReplicationTask) -> DownloadOutcome;
}

/// HTTP client for the release endpoint
#[derive(Debug)]
pub struct SourceClient {
    client: Client,
    rate_limiter: RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>,
    base_url: String,
    download_dir: PathBuf,
}

impl SourceClient {
    /// Build the client from settings
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::Http` if the underlying client cannot be
    /// constructed.
    pub fn new(settings: &Settings) -> DownloadResult<Self> {
        let client = Client::builder()
            .user_agent(http::USER_AGENT)
            .timeout(http::DEFAULT_TIMEOUT)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .pool_idle_timeout(http::POOL_IDLE_TIMEOUT)
            .pool_max_idle_per_host(http::POOL_MAX_PER_HOST)
            .build()?;

        let quota =
            Quota::per_second(NonZeroU32::new(settings.rate_limit_rps).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            client,
            rate_limiter: RateLimiter::direct(quota),
            base_url: settings.base_url.clone(),
            download_dir: settings.download_dir.clone(),
        })
    }

    /// Stream one remote file to its destination path
    async fn fetch_to_file(&self, url: &str, destination: &Path) -> DownloadResult<()> {
        // Smooth request bursts across the worker pool
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(std::time::Duration::from_millis(100)))
            .await;

        let response = self.client.get(url).send().await?;

        if response.status().as_u16() == 404 {
            return Err(DownloadError::NotFound {
                url: url.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(DownloadError::ServerError {
                status: response.status().as_u16(),
            });
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = File::create(destination).await?;
        let mut stream = response.bytes_stream();
        let mut bytes_written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!("Wrote {} bytes to {}", bytes_written, destination.display());
        Ok(())
    }
}

#[async_trait]
impl TaskFetcher for SourceClient {
    async fn fetch(&self, task: &ReplicationTask) -> DownloadOutcome {
        let url = task.url(&self.base_url);
        let destination = task.local_path(&self.download_dir);

        info!("Downloading {} ...", url);
        match self.fetch_to_file(&url, &destination).await {
            Ok(()) => {
                info!("Downloaded: {}", destination.display());
                DownloadOutcome::downloaded(*task, destination)
            }
            Err(e) => {
                warn!("FAILED download {}: {}", url, e);
                // Best-effort cleanup of a partially written file
                let _ = tokio::fs::remove_file(&destination).await;
                DownloadOutcome::dropped(*task)
            }
        }
    }
}
