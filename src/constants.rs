//! Application constants for tripdata mirror
//!
//! Centralizes the constants used throughout the application, organized by
//! functional domain. Defaults mirror the published DataTalksClub release
//! catalog for the 2019-2020 NYC TLC archive.

use std::time::Duration;

/// Environment variable names for object-store credentials
///
/// These override the credentials file when set, which keeps CI runs and
/// local `.env` files working without a secrets directory.
pub mod env {
    /// Access key ID for the object store
    pub const ACCESS_KEY_ID: &str = "MIRROR_ACCESS_KEY_ID";

    /// Secret access key for the object store
    pub const SECRET_ACCESS_KEY: &str = "MIRROR_SECRET_ACCESS_KEY";

    /// Optional endpoint override for S3-compatible stores
    pub const ENDPOINT_URL: &str = "MIRROR_ENDPOINT_URL";
}

/// Remote release source configuration
pub mod source {
    /// Base URL for the DataTalksClub NYC TLC release files
    pub const BASE_URL: &str = "https://github.com/DataTalksClub/nyc-tlc-data/releases/download";

    /// Default years covered by the mirror
    pub const DEFAULT_YEARS: [u16; 2] = [2019, 2020];
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// User agent for all HTTP requests
    pub const USER_AGENT: &str = "tripdata-mirror/0.1.0 (Dataset Replication Tool)";

    /// Default HTTP request timeout
    ///
    /// Release files run to a few hundred MB; allow a generous window.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 8;

    /// Default rate limit for source requests (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 10;
}

/// Object store defaults
pub mod storage {
    /// Default bucket region
    pub const DEFAULT_REGION: &str = "us-east-1";

    /// Default credentials file path
    pub const DEFAULT_CREDENTIALS_FILE: &str = "secrets/storage.toml";

    /// Upload streaming chunk size (8 MiB)
    ///
    /// Controls memory footprint and network framing, not correctness.
    pub const UPLOAD_CHUNK_SIZE: usize = 8 * 1024 * 1024;
}

/// Worker pool and retry configuration
pub mod workers {
    use super::Duration;

    /// Default number of workers shared by the download and upload phases
    pub const DEFAULT_WORKER_COUNT: usize = 6;

    /// Maximum recommended concurrent workers
    pub const MAX_WORKER_COUNT: usize = 16;

    /// Maximum upload attempts per file
    ///
    /// Downloads are deliberately never retried; see `SourceClient`.
    pub const MAX_UPLOAD_RETRIES: u32 = 3;

    /// Fixed delay between upload retry attempts
    pub const UPLOAD_RETRY_BACKOFF: Duration = Duration::from_secs(3);
}

/// Local file layout
pub mod files {
    /// Default download directory
    pub const DEFAULT_DOWNLOAD_DIR: &str = "./data";
}

// Re-export commonly used constants for convenience
pub use http::{DEFAULT_RATE_LIMIT_RPS, USER_AGENT};
pub use source::BASE_URL as SOURCE_BASE_URL;
pub use storage::UPLOAD_CHUNK_SIZE;
pub use workers::{DEFAULT_WORKER_COUNT, MAX_UPLOAD_RETRIES, UPLOAD_RETRY_BACKOFF};
