//! Bucket provisioning
//!
//! Ensures the destination bucket exists and is usable before any transfer
//! work starts. This is a hard gate: it runs sequentially, and any fatal
//! outcome terminates the run with nothing downloaded or uploaded.

use tracing::info;

use super::storage::{BucketCreation, BucketStatus, ObjectStore};
use crate::errors::{ProvisionError, ProvisionResult};

/// Ensure the destination bucket is ready
///
/// Idempotent: a bucket that already exists under the current credentials is
/// left untouched, so calling this repeatedly performs at most one create.
///
/// # Errors
///
/// - [`ProvisionError::NameTaken`] when the bucket exists under a different
///   owner (also covers losing a creation race to one).
/// - [`ProvisionError::Inaccessible`] when the bucket exists but the current
///   credentials cannot access it.
pub async fn ensure_bucket(store: &dyn ObjectStore) -> ProvisionResult<()> {
    let bucket = store.bucket_name();

    match store.bucket_status().await? {
        BucketStatus::Owned => {
            info!("Bucket '{}' exists. Proceeding...", bucket);
            Ok(())
        }
        BucketStatus::Missing => match store.create_bucket().await? {
            BucketCreation::Created => {
                info!("Created bucket '{}'", bucket);
                Ok(())
            }
            BucketCreation::AlreadyOwned => {
                info!("Bucket '{}' already present. Proceeding...", bucket);
                Ok(())
            }
            BucketCreation::NameTaken => Err(ProvisionError::NameTaken {
                bucket: bucket.to_string(),
            }),
        },
        BucketStatus::ForeignOwner => Err(ProvisionError::NameTaken {
            bucket: bucket.to_string(),
        }),
        BucketStatus::Inaccessible => Err(ProvisionError::Inaccessible {
            bucket: bucket.to_string(),
        }),
    }
}
