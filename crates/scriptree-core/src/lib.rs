//! Core types for scriptree.
//!
//! This crate provides the fundamental data structures of the virtual file
//! tree: file and folder nodes, immutable tree snapshots with structural
//! sharing, slash-delimited paths and the resolver that walks them.

mod config;
mod error;
mod name;
mod node;
mod path;
mod tree;
mod wire;

pub use config::{
    ArchiveCompression, ConfigError, EditorConfig, EditorConfigBuilder, FolderEntries,
};
pub use error::TreeError;
pub use name::{MAX_NAME_LEN, validate_name};
pub use node::{Children, FileNode, FolderNode, Node, NodeKind, NodeRef};
pub use path::{NodePath, exists, resolve, resolve_folder};
pub use tree::{Tree, TreeStats, Walk};
