//! Core application logic for tripdata mirror
//!
//! This module contains the replication pipeline components: the data
//! models and task enumerator, the HTTP source client, the object-store
//! layer with bucket provisioning, the upload retry machinery, and the
//! coordinator that drives the two phase-barriered rounds.

pub mod client;
pub mod coordinator;
pub mod models;
pub mod pool;
pub mod provision;
pub mod storage;
pub mod upload;

// Re-export main public API
pub use client::{SourceClient, TaskFetcher};
pub use coordinator::{Coordinator, MirrorSummary};
pub use models::{enumerate_tasks, DatasetKind, DownloadOutcome, ReplicationTask, UploadOutcome};
pub use pool::WorkerPool;
pub use provision::ensure_bucket;
pub use storage::{BucketCreation, BucketStatus, ObjectStore, S3Store};
pub use upload::Uploader;
