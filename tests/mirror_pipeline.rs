//! Integration tests for the mirror pipeline
//!
//! These tests drive the coordinator end-to-end through the public API,
//! with in-memory doubles standing in for the HTTP source and the object
//! store, and verify the run-level contracts: the provisioning gate, the
//! download/upload phase barrier, retry accounting, and the final summary.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use tripdata_mirror::app::{
    BucketCreation, BucketStatus, Coordinator, DatasetKind, DownloadOutcome, ObjectStore,
    ReplicationTask, TaskFetcher,
};
use tripdata_mirror::config::Settings;
use tripdata_mirror::errors::StorageResult;

/// Create settings for a small, fast integration run
fn integration_settings(download_dir: &Path) -> Settings {
    Settings {
        kinds: vec![DatasetKind::Yellow, DatasetKind::Green],
        years: vec![2019],
        months: vec![1, 2],
        worker_count: 2,
        max_retries: 3,
        retry_backoff_secs: 0,
        download_dir: download_dir.to_path_buf(),
        ..Settings::default()
    }
}

/// Fetcher double that writes real files into the download directory
struct LocalFetcher {
    download_dir: PathBuf,
    missing: HashSet<ReplicationTask>,
}

impl LocalFetcher {
    fn new(download_dir: PathBuf) -> Self {
        Self {
            download_dir,
            missing: HashSet::new(),
        }
    }
}

#[async_trait]
impl TaskFetcher for LocalFetcher {
    async fn fetch(&self, task: &ReplicationTask) -> DownloadOutcome {
        if self.missing.contains(task) {
            return DownloadOutcome::dropped(*task);
        }
        let path = task.local_path(&self.download_dir);
        std::fs::write(&path, b"trip data").unwrap();
        DownloadOutcome::downloaded(*task, path)
    }
}

/// In-memory store whose puts fail until a configured attempt number
struct FlakyStore {
    status: BucketStatus,
    put_succeeds_from: u32,
    put_calls: AtomicU32,
    create_calls: AtomicU32,
    blobs: Mutex<HashSet<String>>,
}

impl FlakyStore {
    fn reliable() -> Self {
        Self::failing_until(1)
    }

    fn failing_until(put_succeeds_from: u32) -> Self {
        Self {
            status: BucketStatus::Missing,
            put_succeeds_from,
            put_calls: AtomicU32::new(0),
            create_calls: AtomicU32::new(0),
            blobs: Mutex::new(HashSet::new()),
        }
    }
}

#[async_trait]
impl ObjectStore for FlakyStore {
    fn bucket_name(&self) -> &str {
        "integration-bucket"
    }

    async fn bucket_status(&self) -> StorageResult<BucketStatus> {
        if self.create_calls.load(Ordering::SeqCst) > 0 {
            Ok(BucketStatus::Owned)
        } else {
            Ok(self.status)
        }
    }

    async fn create_bucket(&self) -> StorageResult<BucketCreation> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(BucketCreation::Created)
    }

    async fn put_blob(&self, _local_path: &Path, blob_name: &str) -> StorageResult<()> {
        let call = self.put_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call >= self.put_succeeds_from {
            self.blobs.lock().unwrap().insert(blob_name.to_string());
        }
        // A put that "failed" still returns Ok here; the missing blob makes
        // the uploader's verification step fail instead, which exercises the
        // same retry path through the public API.
        Ok(())
    }

    async fn blob_exists(&self, blob_name: &str) -> StorageResult<bool> {
        Ok(self.blobs.lock().unwrap().contains(blob_name))
    }
}

#[tokio::test]
async fn test_full_mirror_run_provisions_and_uploads_everything() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Arc::new(integration_settings(temp_dir.path()));
    let fetcher = Arc::new(LocalFetcher::new(temp_dir.path().to_path_buf()));
    let store = Arc::new(FlakyStore::reliable());

    let coordinator = Coordinator::new(
        settings,
        fetcher.clone() as Arc<dyn TaskFetcher>,
        store.clone() as Arc<dyn ObjectStore>,
    );
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.tasks, 4);
    assert_eq!(summary.downloaded, 4);
    assert_eq!(summary.uploaded, 4);
    assert_eq!(summary.gave_up, 0);

    // The missing bucket was created exactly once
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);

    // Every enumerated file landed under its canonical blob name
    let blobs = store.blobs.lock().unwrap();
    assert!(blobs.contains("yellow_tripdata_2019-01.csv.gz"));
    assert!(blobs.contains("green_tripdata_2019-02.csv.gz"));
}

#[tokio::test]
async fn test_missing_remote_file_is_dropped_and_the_rest_still_upload() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Arc::new(integration_settings(temp_dir.path()));

    let mut fetcher = LocalFetcher::new(temp_dir.path().to_path_buf());
    fetcher
        .missing
        .insert(ReplicationTask::new(DatasetKind::Yellow, 2019, 2));
    let fetcher = Arc::new(fetcher);
    let store = Arc::new(FlakyStore::reliable());

    let coordinator = Coordinator::new(
        settings,
        fetcher.clone() as Arc<dyn TaskFetcher>,
        store.clone() as Arc<dyn ObjectStore>,
    );
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.tasks, 4);
    assert_eq!(summary.downloaded, 3);
    assert_eq!(summary.dropped, 1);
    assert_eq!(summary.uploaded, 3);
    assert!(!store
        .blobs
        .lock()
        .unwrap()
        .contains("yellow_tripdata_2019-02.csv.gz"));
}

#[tokio::test]
async fn test_transient_upload_failures_are_retried_to_success() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = integration_settings(temp_dir.path());
    // One task so the flaky put schedule is deterministic
    settings.kinds = vec![DatasetKind::Yellow];
    settings.months = vec![1];
    settings.worker_count = 1;

    let fetcher = Arc::new(LocalFetcher::new(temp_dir.path().to_path_buf()));
    // First put leaves no blob behind; the second succeeds
    let store = Arc::new(FlakyStore::failing_until(2));

    let coordinator = Coordinator::new(
        Arc::new(settings),
        fetcher.clone() as Arc<dyn TaskFetcher>,
        store.clone() as Arc<dyn ObjectStore>,
    );
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.uploaded, 1);
    assert_eq!(summary.gave_up, 0);
    assert_eq!(store.put_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_exhausted_retries_are_reported_but_do_not_fail_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = integration_settings(temp_dir.path());
    settings.kinds = vec![DatasetKind::Green];
    settings.months = vec![1];
    settings.worker_count = 1;

    let fetcher = Arc::new(LocalFetcher::new(temp_dir.path().to_path_buf()));
    // Puts never land a blob within the attempt budget
    let store = Arc::new(FlakyStore::failing_until(u32::MAX));

    let coordinator = Coordinator::new(
        Arc::new(settings),
        fetcher.clone() as Arc<dyn TaskFetcher>,
        store.clone() as Arc<dyn ObjectStore>,
    );
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.downloaded, 1);
    assert_eq!(summary.uploaded, 0);
    assert_eq!(summary.gave_up, 1);
    // Exactly max_retries attempts were made
    assert_eq!(store.put_calls.load(Ordering::SeqCst), 3);
}
