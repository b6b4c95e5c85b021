//! Data models for tripdata mirror
//!
//! This module defines the core data structures used throughout the
//! application: the dataset kinds, the replication task triple that fully
//! determines a remote file, and the per-phase outcome records.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Kind of trip-data release file
///
/// Renders as the lowercase token used in both the URL path prefix and the
/// file name (e.g. `yellow_tripdata_2019-01.csv.gz` lives under `yellow/`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Yellow medallion taxi trips
    Yellow,
    /// Green street-hail livery trips
    Green,
}

impl DatasetKind {
    /// Parse from the lowercase wire token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "yellow" => Some(Self::Yellow),
            "green" => Some(Self::Green),
            _ => None,
        }
    }

    /// Get the lowercase wire token
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Green => "green",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_token())
    }
}

impl std::str::FromStr for DatasetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| format!("unknown dataset kind: '{s}'"))
    }
}

/// One unit of replication work
///
/// Immutable; the three fields fully determine the remote URL and the
/// canonical file name. Identity is field equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplicationTask {
    /// Dataset kind (URL path prefix and file name stem)
    pub kind: DatasetKind,
    /// Four-digit year
    pub year: u16,
    /// Month, 1-12
    pub month: u8,
}

impl ReplicationTask {
    /// Create a new replication task
    pub fn new(kind: DatasetKind, year: u16, month: u8) -> Self {
        Self { kind, year, month }
    }

    /// Canonical file name, e.g. `yellow_tripdata_2019-01.csv.gz`
    pub fn file_name(&self) -> String {
        format!(
            "{}_tripdata_{}-{:02}.csv.gz",
            self.kind, self.year, self.month
        )
    }

    /// Source URL under the per-kind path prefix
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}",
            base_url.trim_end_matches('/'),
            self.kind,
            self.file_name()
        )
    }

    /// Local destination path inside the download directory
    pub fn local_path(&self, download_dir: &Path) -> PathBuf {
        download_dir.join(self.file_name())
    }
}

impl fmt::Display for ReplicationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}-{:02}", self.kind, self.year, self.month)
    }
}

/// Result of one download attempt
///
/// Produced exactly once per task. A `None` path means the task is dropped
/// from all further processing; it is never retried within a run.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    /// The task this outcome belongs to
    pub task: ReplicationTask,
    /// Local file path on success, `None` when the download failed
    pub local_path: Option<PathBuf>,
}

impl DownloadOutcome {
    /// Outcome for a successfully downloaded file
    pub fn downloaded(task: ReplicationTask, local_path: PathBuf) -> Self {
        Self {
            task,
            local_path: Some(local_path),
        }
    }

    /// Outcome for a dropped task
    pub fn dropped(task: ReplicationTask) -> Self {
        Self {
            task,
            local_path: None,
        }
    }
}

/// Terminal result of the upload state machine for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Destination blob name (the file's base name)
    pub blob_name: String,
    /// Whether the final attempt's existence check confirmed the blob
    pub succeeded: bool,
    /// Number of attempts consumed, always within `1..=max_retries`
    pub attempts_used: u32,
}

/// Enumerate the full replication catalog
///
/// Produces the `kinds x years x months` cross-product in a stable order
/// (kind outer, year middle, month inner) so runs log reproducibly. Pure
/// function of its inputs; no I/O and no failure mode.
pub fn enumerate_tasks(kinds: &[DatasetKind], years: &[u16], months: &[u8]) -> Vec<ReplicationTask> {
    let mut tasks = Vec::with_capacity(kinds.len() * years.len() * months.len());
    for &kind in kinds {
        for &year in years {
            for &month in months {
                tasks.push(ReplicationTask::new(kind, year, month));
            }
        }
    }
    tasks
}
