//! Object-store access for tripdata mirror
//!
//! Defines the [`ObjectStore`] seam the provisioner, uploader, and
//! verification checker talk through, plus the S3-compatible implementation.
//! Keeping the trait narrow (status, create, put, head) is what lets the
//! retry and provisioning logic be tested against in-memory doubles.

use std::path::Path;

use async_trait::async_trait;

use crate::errors::StorageResult;

mod s3;

pub use s3::S3Store;

/// Observed state of the destination bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketStatus {
    /// Bucket does not exist anywhere
    Missing,
    /// Bucket exists and is owned by the current credentials
    Owned,
    /// Bucket exists and is reachable but belongs to a different owner
    ForeignOwner,
    /// Bucket exists but the current credentials cannot access it
    Inaccessible,
}

/// Result of a bucket creation call
///
/// Creation can race with another writer, so "already owned" and "name
/// taken" are outcomes rather than errors; the provisioner decides which
/// are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketCreation {
    /// Bucket was created by this call
    Created,
    /// Bucket already existed under the current credentials
    AlreadyOwned,
    /// Bucket name is held by a different owner
    NameTaken,
}

/// Operations the mirror needs from an object store
///
/// The client handle behind an implementation is shared and read-mostly;
/// every method is safe to call concurrently.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the destination bucket
    fn bucket_name(&self) -> &str;

    /// Probe the destination bucket's state
    async fn bucket_status(&self) -> StorageResult<BucketStatus>;

    /// Create the destination bucket at the configured region
    async fn create_bucket(&self) -> StorageResult<BucketCreation>;

    /// Stream a local file into the bucket under `blob_name`
    ///
    /// Re-uploading an existing blob name overwrites it, which is what makes
    /// upload retries safe to repeat.
    async fn put_blob(&self, local_path: &Path, blob_name: &str) -> StorageResult<()>;

    /// Read-only existence check for a blob
    ///
    /// Used only as the uploader's post-condition, never as a precondition.
    async fn blob_exists(&self, blob_name: &str) -> StorageResult<bool>;
}
