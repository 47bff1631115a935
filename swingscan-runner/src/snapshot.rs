//! Snapshot persistence, run off the screening path.
//!
//! A finished run hands a [`SnapshotRecord`] to [`persist_detached`], which
//! writes it on a background thread. Write failures are logged and dropped;
//! they never reach the caller of the screen.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swingscan_core::SnapshotSummary;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub created_at: DateTime<Utc>,
    pub summary: SnapshotSummary,
}

impl SnapshotRecord {
    pub fn new(summary: SnapshotSummary) -> Self {
        Self {
            created_at: Utc::now(),
            summary,
        }
    }

    /// `snapshot_<utc timestamp>_<digest prefix>.json`
    pub fn file_name(&self) -> String {
        let prefix: String = self.summary.digest.chars().take(12).collect();
        format!(
            "snapshot_{}_{prefix}.json",
            self.created_at.format("%Y%m%dT%H%M%S%.3fZ")
        )
    }
}

/// Destination for snapshot records.
pub trait SnapshotSink: Send + Sync {
    fn persist(&self, record: &SnapshotRecord) -> Result<(), SnapshotError>;
}

/// Writes each record as pretty JSON into a directory.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SnapshotSink for JsonFileSink {
    fn persist(&self, record: &SnapshotRecord) -> Result<(), SnapshotError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| SnapshotError::Io { path, source }
        };

        std::fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        let json = serde_json::to_string_pretty(record)?;

        // temp file + rename so readers never see a partial snapshot
        let path = self.dir.join(record.file_name());
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err(&tmp))?;
        std::fs::rename(&tmp, &path).map_err(io_err(&path))?;

        info!(path = %path.display(), "snapshot written");
        Ok(())
    }
}

/// Persist `record` on a named background thread.
///
/// Returns the thread handle so short-lived callers (the CLI) can wait for the
/// write before exiting; `None` if the thread could not be spawned.
pub fn persist_detached(
    sink: Arc<dyn SnapshotSink>,
    record: SnapshotRecord,
) -> Option<JoinHandle<()>> {
    let spawned = std::thread::Builder::new()
        .name("snapshot-writer".into())
        .spawn(move || {
            if let Err(e) = sink.persist(&record) {
                warn!(error = %e, digest = %record.summary.digest, "snapshot persistence failed");
            }
        });
    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "could not spawn snapshot writer");
            None
        }
    }
}
