//! Error types for the storage layer.

use std::path::PathBuf;

use thiserror::Error;

use quire_core::EntryId;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No entry at this position in the content list.
    #[error("entry not found: {0}")]
    EntryNotFound(EntryId),

    /// Content directory does not exist or is not a directory.
    #[error("content directory missing: {}", .0.display())]
    ContentDirMissing(PathBuf),

    /// File system error on a specific path.
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rendering task panicked or was cancelled.
    #[error("render task failed: {0}")]
    Render(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
