//! S3-compatible object-store implementation
//!
//! Wraps the AWS SDK S3 client behind the [`ObjectStore`] trait. Works
//! against AWS itself or any S3-compatible endpoint (MinIO, R2) via the
//! `endpoint_url` override, in which case path-style addressing is forced.

use std::path::Path;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use tracing::debug;

use super::{BucketCreation, BucketStatus, ObjectStore};
use crate::config::{Settings, StoreCredentials};
use crate::errors::{StorageError, StorageResult};

/// S3-compatible object store bound to one bucket
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    region: String,
    chunk_size: usize,
}

impl S3Store {
    /// Build a store from settings and credentials
    ///
    /// Credentials are static for the whole process lifetime; the endpoint
    /// override from the credentials file wins over the one in settings.
    pub async fn connect(settings: &Settings, credentials: &StoreCredentials) -> Self {
        let creds = Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            "tripdata-mirror",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.bucket_region.clone()))
            .credentials_provider(creds)
            .load()
            .await;

        let endpoint = credentials
            .endpoint_url
            .clone()
            .or_else(|| settings.endpoint_url.clone());

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = endpoint {
            debug!("Using custom object-store endpoint: {}", endpoint);
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: settings.bucket_name.clone(),
            region: settings.bucket_region.clone(),
            chunk_size: settings.chunk_size,
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket_name(&self) -> &str {
        &self.bucket
    }

    async fn bucket_status(&self) -> StorageResult<BucketStatus> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                // Reachable is not the same as ours: cross-check against the
                // buckets these credentials actually own.
                let listing = self.client.list_buckets().send().await.map_err(|err| {
                    StorageError::BucketProbe {
                        bucket: self.bucket.clone(),
                        source: Box::new(err),
                    }
                })?;

                let owned = listing
                    .buckets()
                    .iter()
                    .filter_map(|b| b.name())
                    .any(|name| name == self.bucket);

                if owned {
                    Ok(BucketStatus::Owned)
                } else {
                    Ok(BucketStatus::ForeignOwner)
                }
            }
            Err(err) => match err.raw_response().map(|r| r.status().as_u16()) {
                Some(404) => Ok(BucketStatus::Missing),
                Some(403) => Ok(BucketStatus::Inaccessible),
                _ => Err(StorageError::BucketProbe {
                    bucket: self.bucket.clone(),
                    source: Box::new(err),
                }),
            },
        }
    }

    async fn create_bucket(&self) -> StorageResult<BucketCreation> {
        let mut request = self.client.create_bucket().bucket(&self.bucket);

        // us-east-1 is the S3 default and must not be sent as a constraint
        if self.region != "us-east-1" {
            let constraint = BucketLocationConstraint::from(self.region.as_str());
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(constraint)
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => Ok(BucketCreation::Created),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_bucket_already_owned_by_you() {
                    Ok(BucketCreation::AlreadyOwned)
                } else if service_err.is_bucket_already_exists() {
                    Ok(BucketCreation::NameTaken)
                } else {
                    Err(StorageError::CreateBucket {
                        bucket: self.bucket.clone(),
                        source: Box::new(service_err),
                    })
                }
            }
        }
    }

    async fn put_blob(&self, local_path: &Path, blob_name: &str) -> StorageResult<()> {
        // Fixed-size reads from disk bound the memory footprint per upload
        let body = ByteStream::read_from()
            .path(local_path)
            .buffer_size(self.chunk_size)
            .build()
            .await
            .map_err(|_| StorageError::LocalRead {
                path: local_path.to_path_buf(),
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(blob_name)
            .body(body)
            .send()
            .await
            .map_err(|err| StorageError::Upload {
                blob_name: blob_name.to_string(),
                source: Box::new(err.into_service_error()),
            })?;

        debug!("Put blob: s3://{}/{}", self.bucket, blob_name);
        Ok(())
    }

    async fn blob_exists(&self, blob_name: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(blob_name)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(StorageError::Head {
                        blob_name: blob_name.to_string(),
                        source: Box::new(service_err),
                    })
                }
            }
        }
    }
}
