//! Error types for the eventbuddy engine.
//!
//! Each of the three operations has its own error enum so callers can match
//! on exactly the failures that operation can produce. Per-record problems
//! inside a feed batch are not errors: the syncer skips them with a warning
//! and reports the count.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from reconciling a remote feed against the store.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The feed source could not supply bytes at all.
    #[error("Feed unavailable: {0}")]
    FeedUnavailable(String),

    /// The top-level feed envelope failed to decode. Individual bad records
    /// are skipped instead and never produce this.
    #[error("Feed envelope is malformed")]
    FeedMalformed(#[source] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from assembling a backup package.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Could not encode backup")]
    Encode(#[source] serde_json::Error),

    #[error("Could not write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ExportError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Write {
            path: path.into(),
            source,
        }
    }
}

/// Errors from restoring a backup. All of these abort before any entity is
/// written to the store.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Neither a backup file nor a package directory containing one.
    #[error("No backup found at {0}")]
    SourceNotFound(PathBuf),

    #[error("Could not read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Backup file is not valid JSON")]
    Decode(#[source] serde_json::Error),

    #[error("Unsupported backup version '{found}' (expected '{expected}')")]
    IncompatibleVersion {
        found: String,
        expected: &'static str,
    },

    /// A relationship edge names an id missing from the backup's own entity
    /// lists. Checked against the envelope, not the live store.
    #[error("Backup references unknown {kind} id {id}")]
    ReferentialIntegrity { kind: &'static str, id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from the storage collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store file is corrupt")]
    Corrupt(#[source] serde_json::Error),

    #[error("Could not serialize store state")]
    Serialize(#[source] serde_json::Error),
}
