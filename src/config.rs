//! Configuration management for tripdata mirror
//!
//! Provides the process-wide [`Settings`] value: loaded once at startup from
//! an optional TOML file (with standard-location discovery), validated, and
//! then passed explicitly into every component. Nothing reads configuration
//! from ambient global state after startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::app::models::DatasetKind;
use crate::constants::{files, http, source, storage, workers};
use crate::errors::{ConfigError, Result};

/// Process-wide immutable settings
///
/// All fields have working defaults; a config file only needs to override
/// what differs from the published 2019-2020 catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Destination bucket name
    pub bucket_name: String,
    /// Bucket region used when the bucket has to be created
    pub bucket_region: String,
    /// Optional endpoint override for S3-compatible stores
    pub endpoint_url: Option<String>,
    /// Base URL of the release endpoint
    pub base_url: String,
    /// Dataset kinds to mirror
    pub kinds: Vec<DatasetKind>,
    /// Years to mirror
    pub years: Vec<u16>,
    /// Months to mirror (1-12)
    pub months: Vec<u8>,
    /// Local directory downloads land in
    pub download_dir: PathBuf,
    /// Upload streaming chunk size in bytes
    pub chunk_size: usize,
    /// Worker pool size shared by both phases
    pub worker_count: usize,
    /// Maximum upload attempts per file
    pub max_retries: u32,
    /// Fixed backoff between upload attempts, in seconds
    pub retry_backoff_secs: u64,
    /// Rate limit for source requests (requests per second)
    pub rate_limit_rps: u32,
    /// Path to the object-store credentials file
    pub credentials_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bucket_name: "nyc-tripdata-mirror".to_string(),
            bucket_region: storage::DEFAULT_REGION.to_string(),
            endpoint_url: None,
            base_url: source::BASE_URL.to_string(),
            kinds: vec![DatasetKind::Yellow, DatasetKind::Green],
            years: source::DEFAULT_YEARS.to_vec(),
            months: (1..=12).collect(),
            download_dir: PathBuf::from(files::DEFAULT_DOWNLOAD_DIR),
            chunk_size: storage::UPLOAD_CHUNK_SIZE,
            worker_count: workers::DEFAULT_WORKER_COUNT,
            max_retries: workers::MAX_UPLOAD_RETRIES,
            retry_backoff_secs: workers::UPLOAD_RETRY_BACKOFF.as_secs(),
            rate_limit_rps: http::DEFAULT_RATE_LIMIT_RPS,
            credentials_file: PathBuf::from(storage::DEFAULT_CREDENTIALS_FILE),
        }
    }
}

impl Settings {
    /// Load settings with file discovery
    ///
    /// An explicitly requested file must exist; otherwise standard locations
    /// are probed and defaults are used when nothing is found.
    pub async fn load(config_file_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path }.into());
                }
                Some(path)
            }
            None => Self::find_config_file(),
        };

        let settings = match config_path {
            Some(path) => {
                debug!("Loading config from: {}", path.display());
                Self::load_from_file(&path).await?
            }
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Probe standard config file locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![
            PathBuf::from("./tripdata-mirror.toml"),
            PathBuf::from("./config.toml"),
        ];
        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("tripdata-mirror").join("config.toml"));
        }

        search_paths.into_iter().find(|path| path.exists())
    }

    /// Load settings from a TOML file
    async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(ConfigError::Io)?;
        let settings: Settings = toml::from_str(&content).map_err(ConfigError::InvalidFormat)?;
        Ok(settings)
    }

    /// Validate field combinations that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.bucket_name.is_empty() {
            return Err(invalid("bucket_name", "must not be empty"));
        }
        if Url::parse(&self.base_url).is_err() {
            return Err(invalid("base_url", "must be a valid absolute URL"));
        }
        if self.kinds.is_empty() {
            return Err(invalid("kinds", "at least one dataset kind is required"));
        }
        if self.years.is_empty() {
            return Err(invalid("years", "at least one year is required"));
        }
        if self.months.is_empty() || self.months.iter().any(|m| !(1..=12).contains(m)) {
            return Err(invalid("months", "months must be within 1-12"));
        }
        if self.worker_count == 0 {
            return Err(invalid("worker_count", "must be greater than 0"));
        }
        if self.worker_count > workers::MAX_WORKER_COUNT {
            return Err(invalid(
                "worker_count",
                "exceeds the maximum recommended worker count",
            ));
        }
        if self.max_retries == 0 {
            return Err(invalid("max_retries", "must be at least 1"));
        }
        if self.chunk_size == 0 {
            return Err(invalid("chunk_size", "must be greater than 0"));
        }
        Ok(())
    }

    /// Fixed backoff between upload attempts
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_secs)
    }
}

fn invalid(field: &str, reason: &str) -> crate::errors::AppError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Object-store credentials, read once at startup
///
/// Loaded from the credentials file, with environment variables taking
/// precedence so secrets never have to touch the working tree.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreCredentials {
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Optional endpoint override, e.g. for MinIO or R2
    pub endpoint_url: Option<String>,
}

impl StoreCredentials {
    /// Load credentials, preferring environment variables over the file
    pub async fn load(credentials_file: &Path) -> Result<Self> {
        use crate::constants::env;

        if let (Ok(access_key_id), Ok(secret_access_key)) = (
            std::env::var(env::ACCESS_KEY_ID),
            std::env::var(env::SECRET_ACCESS_KEY),
        ) {
            debug!("Using object-store credentials from environment");
            return Ok(Self {
                access_key_id,
                secret_access_key,
                endpoint_url: std::env::var(env::ENDPOINT_URL).ok(),
            });
        }

        let content = tokio::fs::read_to_string(credentials_file)
            .await
            .map_err(|_| ConfigError::CredentialsUnreadable {
                path: credentials_file.to_path_buf(),
            })?;
        let creds: StoreCredentials =
            toml::from_str(&content).map_err(ConfigError::InvalidFormat)?;

        if creds.access_key_id.is_empty() {
            return Err(ConfigError::MissingCredential {
                field: "access_key_id".to_string(),
            }
            .into());
        }
        if creds.secret_access_key.is_empty() {
            return Err(ConfigError::MissingCredential {
                field: "secret_access_key".to_string(),
            }
            .into());
        }

        debug!(
            "Loaded object-store credentials from {}",
            credentials_file.display()
        );
        Ok(creds)
    }
}
