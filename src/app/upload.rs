//! Upload state machine with retry, backoff, and verification
//!
//! One [`Uploader`] is shared by all upload workers. Each file runs the same
//! per-file state machine: stream the file to the bucket, verify the blob
//! actually landed with a read-only existence check, and retry with a fixed
//! backoff until success or the attempt budget is exhausted.
//!
//! The backoff sleep runs on the worker slot, so a failing upload reduces
//! effective pool concurrency while it waits. Acceptable at this pool size.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::models::UploadOutcome;
use super::storage::ObjectStore;

/// Uploads local files to the object store with bounded retries
pub struct Uploader {
    store: Arc<dyn ObjectStore>,
    max_retries: u32,
    backoff: Duration,
}

impl Uploader {
    /// Create an uploader
    ///
    /// `max_retries` is the total attempt budget per file (minimum 1);
    /// `backoff` is the fixed pause between consecutive attempts.
    pub fn new(store: Arc<dyn ObjectStore>, max_retries: u32, backoff: Duration) -> Self {
        Self {
            store,
            max_retries: max_retries.max(1),
            backoff,
        }
    }

    /// Upload one file, verifying the blob after every successful put
    ///
    /// Terminal states: succeeded (existence check confirmed the blob) or
    /// gave up (`attempts_used == max_retries`). An upload error and a
    /// failed verification are treated identically. Infallible by contract;
    /// the outcome carries the result either way.
    pub async fn upload(&self, local_path: &Path) -> UploadOutcome {
        let blob_name = blob_name_for(local_path);
        let bucket = self.store.bucket_name();
        let mut attempt: u32 = 1;

        loop {
            info!(
                "Uploading {} to s3://{}/{} (attempt {}) ...",
                local_path.display(),
                bucket,
                blob_name,
                attempt
            );

            match self.store.put_blob(local_path, &blob_name).await {
                Ok(()) => match self.store.blob_exists(&blob_name).await {
                    Ok(true) => {
                        info!("Verified upload: {}", blob_name);
                        return UploadOutcome {
                            blob_name,
                            succeeded: true,
                            attempts_used: attempt,
                        };
                    }
                    Ok(false) => {
                        warn!("Verification failed: {}", blob_name);
                    }
                    Err(e) => {
                        warn!("Verification failed: {}: {}", blob_name, e);
                    }
                },
                Err(e) => {
                    warn!("FAILED upload {}: {}", blob_name, e);
                }
            }

            if attempt == self.max_retries {
                warn!("Gave up on {}", blob_name);
                return UploadOutcome {
                    blob_name,
                    succeeded: false,
                    attempts_used: attempt,
                };
            }

            tokio::time::sleep(self.backoff).await;
            attempt += 1;
        }
    }
}

/// Blob name is the file's base name: a 1:1, collision-free mapping from
/// task to blob given the canonical naming template.
fn blob_name_for(local_path: &Path) -> String {
    local_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| local_path.display().to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::app::storage::{BucketCreation, BucketStatus};
    use crate::errors::{StorageError, StorageResult};

    /// Store double with scripted put/head behavior
    struct FakeStore {
        /// Fail the put call outright on attempts below this (1-based)
        put_succeeds_from: u32,
        /// Report the blob visible from this attempt on (0 = never)
        visible_from: u32,
        put_calls: AtomicU32,
        head_calls: AtomicU32,
    }

    impl FakeStore {
        fn new(put_succeeds_from: u32, visible_from: u32) -> Self {
            Self {
                put_succeeds_from,
                visible_from,
                put_calls: AtomicU32::new(0),
                head_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ObjectStore for FakeStore {
        fn bucket_name(&self) -> &str {
            "test-bucket"
        }

        async fn bucket_status(&self) -> StorageResult<BucketStatus> {
            Ok(BucketStatus::Owned)
        }

        async fn create_bucket(&self) -> StorageResult<BucketCreation> {
            Ok(BucketCreation::AlreadyOwned)
        }

        async fn put_blob(&self, _local_path: &Path, blob_name: &str) -> StorageResult<()> {
            let call = self.put_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call >= self.put_succeeds_from {
                Ok(())
            } else {
                Err(StorageError::Upload {
                    blob_name: blob_name.to_string(),
                    source: "connection reset".into(),
                })
            }
        }

        async fn blob_exists(&self, _blob_name: &str) -> StorageResult<bool> {
            let call = self.head_calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(self.visible_from != 0 && call >= self.visible_from)
        }
    }

    fn uploader(store: FakeStore, max_retries: u32) -> Uploader {
        Uploader::new(Arc::new(store), max_retries, Duration::from_secs(3))
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let up = uploader(FakeStore::new(1, 1), 3);
        let outcome = up.upload(Path::new("/data/yellow_tripdata_2019-01.csv.gz")).await;

        assert!(outcome.succeeded);
        assert_eq!(outcome.attempts_used, 1);
        assert_eq!(outcome.blob_name, "yellow_tripdata_2019-01.csv.gz");
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_put_gives_up_after_max_retries() {
        let up = uploader(FakeStore::new(u32::MAX, 0), 3);

        let start = tokio::time::Instant::now();
        let outcome = up.upload(Path::new("/data/f.csv.gz")).await;

        assert!(!outcome.succeeded);
        assert_eq!(outcome.attempts_used, 3);
        // Backoff runs exactly twice: between attempts 1->2 and 2->3
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_verification_failure_counts_as_attempt_failure() {
        // Puts always succeed but the blob never shows up
        let store = FakeStore::new(1, 0);
        let up = uploader(store, 3);

        let outcome = up.upload(Path::new("/data/f.csv.gz")).await;
        assert!(!outcome.succeeded);
        assert_eq!(outcome.attempts_used, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_on_later_attempt() {
        // Put fails once, then succeeds and verifies
        let up = uploader(FakeStore::new(2, 1), 3);

        let outcome = up.upload(Path::new("/data/f.csv.gz")).await;
        assert!(outcome.succeeded);
        assert_eq!(outcome.attempts_used, 2);
    }

    #[tokio::test]
    async fn test_attempts_stay_within_budget() {
        for max_retries in 1..=4 {
            let up = uploader(FakeStore::new(u32::MAX, 0), max_retries);
            // Zero backoff keeps this loop fast
            let up = Uploader {
                backoff: Duration::ZERO,
                ..up
            };
            let outcome = up.upload(Path::new("/data/f.csv.gz")).await;
            assert!(outcome.attempts_used >= 1);
            assert_eq!(outcome.attempts_used, max_retries);
        }
    }

    #[test]
    fn test_blob_name_is_base_name() {
        assert_eq!(
            blob_name_for(Path::new("./data/green_tripdata_2020-12.csv.gz")),
            "green_tripdata_2020-12.csv.gz"
        );
    }
}
