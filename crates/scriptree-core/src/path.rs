//! Slash-delimited node paths and path resolution.

use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::node::{FolderNode, NodeRef};
use crate::tree::Tree;

/// Path of a node from the root, serialized as `"a/b/c"`.
///
/// The empty path is the root. Parsing drops empty segments, so `"/a//b/"`
/// and `"a/b"` are the same path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NodePath {
    segments: Vec<CompactString>,
}

impl NodePath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-delimited path.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(CompactString::from)
                .collect(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[CompactString] {
        &self.segments
    }

    /// Number of segments (0 for the root).
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Last segment, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(CompactString::as_str)
    }

    /// Parent path, or `None` for the root.
    pub fn parent(&self) -> Option<NodePath> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Append a segment.
    pub fn join(&self, name: &str) -> NodePath {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// Append every segment of a relative path.
    pub fn join_path(&self, rel: &NodePath) -> NodePath {
        let mut segments = self.segments.clone();
        segments.extend_from_slice(&rel.segments);
        Self { segments }
    }

    /// Sibling path with the last segment replaced.
    pub fn with_name(&self, name: &str) -> NodePath {
        match self.parent() {
            Some(parent) => parent.join(name),
            None => Self::root(),
        }
    }

    /// Segment-wise prefix test; every path starts with the root.
    pub fn starts_with(&self, prefix: &NodePath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Replace a leading `from` prefix with `to`.
    ///
    /// Returns `None` when `from` is not a prefix of this path.
    pub fn rebase(&self, from: &NodePath, to: &NodePath) -> Option<NodePath> {
        if !self.starts_with(from) {
            return None;
        }
        let mut segments = to.segments.clone();
        segments.extend_from_slice(&self.segments[from.segments.len()..]);
        Some(Self { segments })
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl From<&str> for NodePath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<&String> for NodePath {
    fn from(s: &String) -> Self {
        Self::parse(s)
    }
}

impl From<String> for NodePath {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&NodePath> for NodePath {
    fn from(path: &NodePath) -> Self {
        path.clone()
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.to_string()
    }
}

/// Resolve a path to the node it names.
///
/// Fails with [`TreeError::InvalidPath`] when an intermediate segment is a
/// file, and with [`TreeError::NotFound`] when a segment is missing.
pub fn resolve<'a>(tree: &'a Tree, path: &NodePath) -> Result<NodeRef<'a>, TreeError> {
    let mut current = NodeRef::Folder(tree.root());

    for segment in path.segments() {
        let folder = match current {
            NodeRef::Folder(folder) => folder,
            NodeRef::File(_) => return Err(TreeError::invalid_path(path)),
        };
        current = match folder.child(segment) {
            Some(child) => child.view(),
            None => return Err(TreeError::not_found(path)),
        };
    }

    Ok(current)
}

/// Resolve a path that must name a folder.
pub fn resolve_folder<'a>(tree: &'a Tree, path: &NodePath) -> Result<&'a FolderNode, TreeError> {
    match resolve(tree, path)? {
        NodeRef::Folder(folder) => Ok(folder),
        NodeRef::File(_) => Err(TreeError::invalid_path(path)),
    }
}

/// Check whether a path resolves.
pub fn exists(tree: &Tree, path: &NodePath) -> bool {
    resolve(tree, path).is_ok()
}
