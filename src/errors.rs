//! Error types for tripdata mirror
//!
//! This module defines the error types for every component of the application.
//! Each domain (configuration, download, object storage, bucket provisioning)
//! gets its own enum so callers can match on the failures they actually handle,
//! with a top-level [`AppError`] folding them together at the binary boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration and credential loading errors
///
/// These surface before any transfer work begins; the process exits
/// immediately rather than entering the retry model.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found at an explicitly requested path
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration file format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Credentials file missing or unreadable
    #[error("Failed to read credentials file: {path}")]
    CredentialsUnreadable { path: PathBuf },

    /// Credentials file parsed but required keys are missing
    #[error("Missing credential field: {field}")]
    MissingCredential { field: String },

    /// A configured value failed validation
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// I/O error reading configuration
    #[error("I/O error reading configuration")]
    Io(#[from] std::io::Error),
}

/// Download and HTTP client errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request error
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success status
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },

    /// Remote resource does not exist
    #[error("Remote file not found: {url}")]
    NotFound { url: String },

    /// I/O error during file operations
    #[error("File I/O error")]
    Io(#[from] std::io::Error),
}

/// Object store operation errors
///
/// Wraps SDK failures behind operation-shaped variants so the rest of the
/// crate never names SDK error types directly.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Blob upload failed
    #[error("Failed to upload blob '{blob_name}': {source}")]
    Upload {
        blob_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Blob existence check failed
    #[error("Failed to check blob '{blob_name}': {source}")]
    Head {
        blob_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Bucket status probe failed
    #[error("Failed to probe bucket '{bucket}': {source}")]
    BucketProbe {
        bucket: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Bucket creation failed
    #[error("Failed to create bucket '{bucket}': {source}")]
    CreateBucket {
        bucket: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Local file could not be read for upload
    #[error("Failed to read local file for upload: {path}")]
    LocalRead { path: PathBuf },
}

/// Fatal bucket provisioning errors
///
/// Any of these aborts the run before a single download starts.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Bucket name is taken by a different owner
    #[error("Bucket '{bucket}' exists but belongs to a different owner. Pick a new name")]
    NameTaken { bucket: String },

    /// Bucket exists but current credentials cannot access it
    #[error("Bucket '{bucket}' exists but is not accessible with the current credentials")]
    Inaccessible { bucket: String },

    /// Underlying storage call failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Object store error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Bucket provisioning error
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Whether this error must terminate the whole run
    ///
    /// Per-task download and upload failures are recovered locally (drop or
    /// retry); only configuration and provisioning failures are fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Config(_) | AppError::Provision(_))
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Download(_) => "download",
            AppError::Storage(_) => "storage",
            AppError::Provision(_) => "provision",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Storage result type alias
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Provisioning result type alias
pub type ProvisionResult<T> = std::result::Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = AppError::Provision(ProvisionError::NameTaken {
            bucket: "taken".to_string(),
        });
        assert_eq!(err.category(), "provision");
        assert!(err.is_fatal());

        let err = AppError::Download(DownloadError::NotFound {
            url: "https://example.com/missing.csv.gz".to_string(),
        });
        assert_eq!(err.category(), "download");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_error_messages_are_actionable() {
        let err = ProvisionError::NameTaken {
            bucket: "my-bucket".to_string(),
        };
        assert!(err.to_string().contains("my-bucket"));
        assert!(err.to_string().contains("different owner"));
    }
}
