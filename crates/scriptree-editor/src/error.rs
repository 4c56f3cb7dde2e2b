use scriptree_core::TreeError;
use scriptree_ops::ArchiveError;
use scriptree_sync::SyncError;
use thiserror::Error;

/// Errors surfaced by an editing session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("Failed to load project: {0}")]
    Load(#[from] SyncError),

    #[error("Export failed: {0}")]
    Archive(#[from] ArchiveError),

    #[error("No file is selected")]
    NoSelection,

    #[error("Background export task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
