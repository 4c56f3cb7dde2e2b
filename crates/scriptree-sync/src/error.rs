//! Persistence errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a persistence store.
///
/// A failed save never rolls back the local tree; it is only reported.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed project document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("Invalid project id '{0}'")]
    InvalidProjectId(String),

    #[error("Store rejected the request: {0}")]
    Backend(String),
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
