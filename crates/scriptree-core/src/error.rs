//! Error types for tree operations.

use compact_str::CompactString;
use thiserror::Error;

use crate::path::NodePath;

/// Errors that can occur while resolving or mutating a tree.
///
/// None of these are fatal to an editing session: a failed operation leaves
/// the snapshot it was applied to untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Path does not resolve to any node.
    #[error("Path not found: '{path}'")]
    NotFound { path: NodePath },

    /// Path descends through a file, or targets something that cannot be
    /// operated on (such as the root).
    #[error("Invalid path: '{path}'")]
    InvalidPath { path: NodePath },

    /// Two siblings would share a name.
    #[error("'{name}' already exists in '{parent}'")]
    NameConflict {
        parent: NodePath,
        name: CompactString,
    },

    /// A folder would become its own descendant.
    #[error("Cannot move '{moved}' into its own subtree at '{target}'")]
    Cycle { moved: NodePath, target: NodePath },

    /// Content access attempted on a folder.
    #[error("Not a file: '{path}'")]
    NotAFile { path: NodePath },

    /// Name rejected by validation.
    #[error("Invalid name '{name}': {reason}")]
    InvalidName {
        name: CompactString,
        reason: String,
    },
}

impl TreeError {
    pub fn not_found(path: impl Into<NodePath>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn invalid_path(path: impl Into<NodePath>) -> Self {
        Self::InvalidPath { path: path.into() }
    }

    pub fn name_conflict(parent: impl Into<NodePath>, name: impl Into<CompactString>) -> Self {
        Self::NameConflict {
            parent: parent.into(),
            name: name.into(),
        }
    }

    pub fn not_a_file(path: impl Into<NodePath>) -> Self {
        Self::NotAFile { path: path.into() }
    }

    /// Short machine-friendly label, used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidPath { .. } => "invalid_path",
            Self::NameConflict { .. } => "name_conflict",
            Self::Cycle { .. } => "cycle",
            Self::NotAFile { .. } => "not_a_file",
            Self::InvalidName { .. } => "invalid_name",
        }
    }
}
