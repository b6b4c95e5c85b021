//! tripdata mirror library
//!
//! Replicates a fixed catalog of NYC TLC trip-data release files into an
//! S3-compatible object-store bucket: idempotent bucket provisioning, a
//! bounded-concurrency download round, a full phase barrier, then a bounded
//! upload round with per-file retry, fixed backoff, and post-upload
//! existence verification.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use constants::*;

    #[test]
    fn test_constants_accessible() {
        assert_eq!(DEFAULT_WORKER_COUNT, 6);
        assert_eq!(MAX_UPLOAD_RETRIES, 3);
        assert!(USER_AGENT.contains("tripdata-mirror"));
    }

    #[test]
    fn test_error_types() {
        let err = AppError::generic("boom");
        assert_eq!(err.category(), "generic");
        assert!(!err.is_fatal());
    }
}
