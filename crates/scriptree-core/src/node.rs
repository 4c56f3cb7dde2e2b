//! File and folder node types.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Children of a folder, keyed by name.
///
/// Values are shared pointers so that a snapshot can reuse every subtree a
/// mutation did not touch.
pub type Children = BTreeMap<CompactString, Arc<Node>>;

/// Type of tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Leaf holding text content.
    File,
    /// Container of other nodes.
    Folder,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Folder => write!(f, "folder"),
        }
    }
}

/// A file: a name and its UTF-8 content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// File name (not full path).
    pub name: CompactString,
    /// Text content.
    pub content: String,
}

impl FileNode {
    /// Create a new empty file.
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            content: String::new(),
        }
    }

    /// Create a file with content.
    pub fn with_content(name: impl Into<CompactString>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A folder: a name and its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderNode {
    /// Folder name (empty for the root).
    pub name: CompactString,
    /// Children keyed by name.
    pub children: Children,
}

impl FolderNode {
    /// Create a new empty folder.
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            children: Children::new(),
        }
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&Arc<Node>> {
        self.children.get(name)
    }

    /// Check whether a direct child with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    /// Get the number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Check if the folder has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Insert a child under its own name, replacing any previous entry.
    pub fn insert(&mut self, node: impl Into<Arc<Node>>) {
        let node = node.into();
        self.children.insert(node.name().into(), node);
    }

    /// Children in display order: folders first, then files, each by name.
    pub fn sorted_children(&self) -> Vec<&Arc<Node>> {
        let mut children: Vec<&Arc<Node>> = self.children.values().collect();
        children.sort_by(|a, b| display_order(a, b));
        children
    }
}

fn display_order(a: &Node, b: &Node) -> Ordering {
    match (a.is_folder(), b.is_folder()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name().cmp(b.name()),
    }
}

/// A single node of the virtual tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File(FileNode),
    Folder(FolderNode),
}

impl Node {
    /// Create an empty file node.
    pub fn file(name: impl Into<CompactString>) -> Self {
        Self::File(FileNode::new(name))
    }

    /// Create an empty folder node.
    pub fn folder(name: impl Into<CompactString>) -> Self {
        Self::Folder(FolderNode::new(name))
    }

    /// Get the node name.
    pub fn name(&self) -> &str {
        match self {
            Self::File(file) => &file.name,
            Self::Folder(folder) => &folder.name,
        }
    }

    /// Get the node kind.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::File(_) => NodeKind::File,
            Self::Folder(_) => NodeKind::Folder,
        }
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Check if this node is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Self::File(file) => Some(file),
            Self::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&FolderNode> {
        match self {
            Self::Folder(folder) => Some(folder),
            Self::File(_) => None,
        }
    }

    /// Borrow this node as a [`NodeRef`].
    pub fn view(&self) -> NodeRef<'_> {
        match self {
            Self::File(file) => NodeRef::File(file),
            Self::Folder(folder) => NodeRef::Folder(folder),
        }
    }

    /// Copy of this node under a different name.
    ///
    /// Children are shared, not deep-copied.
    pub fn renamed(&self, name: impl Into<CompactString>) -> Self {
        match self {
            Self::File(file) => Self::File(FileNode {
                name: name.into(),
                content: file.content.clone(),
            }),
            Self::Folder(folder) => Self::Folder(FolderNode {
                name: name.into(),
                children: folder.children.clone(),
            }),
        }
    }

    /// Number of files in this subtree (1 for a file).
    pub fn file_count(&self) -> u64 {
        match self {
            Self::File(_) => 1,
            Self::Folder(folder) => folder.children.values().map(|c| c.file_count()).sum(),
        }
    }
}

impl From<FileNode> for Node {
    fn from(file: FileNode) -> Self {
        Self::File(file)
    }
}

impl From<FolderNode> for Node {
    fn from(folder: FolderNode) -> Self {
        Self::Folder(folder)
    }
}

impl From<FileNode> for Arc<Node> {
    fn from(file: FileNode) -> Self {
        Arc::new(Node::File(file))
    }
}

impl From<FolderNode> for Arc<Node> {
    fn from(folder: FolderNode) -> Self {
        Arc::new(Node::Folder(folder))
    }
}

/// A borrowed, typed view of a node returned by path resolution.
///
/// The root folder is not stored as a [`Node`], so resolution hands out this
/// view instead of `&Node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    File(&'a FileNode),
    Folder(&'a FolderNode),
}

impl<'a> NodeRef<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Self::File(file) => &file.name,
            Self::Folder(folder) => &folder.name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::File(_) => NodeKind::File,
            Self::Folder(_) => NodeKind::Folder,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    pub fn as_file(&self) -> Option<&'a FileNode> {
        match self {
            Self::File(file) => Some(file),
            Self::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&'a FolderNode> {
        match self {
            Self::Folder(folder) => Some(folder),
            Self::File(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_display() {
        assert_eq!(NodeKind::File.to_string(), "file");
        assert_eq!(NodeKind::Folder.to_string(), "folder");
    }

    #[test]
    fn test_sorted_children_folders_first() {
        let mut folder = FolderNode::new("src");
        folder.insert(FileNode::new("b.lua"));
        folder.insert(FolderNode::new("zeta"));
        folder.insert(FileNode::new("a.lua"));
        folder.insert(FolderNode::new("alpha"));

        let names: Vec<&str> = folder.sorted_children().iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["alpha", "zeta", "a.lua", "b.lua"]);
    }

    #[test]
    fn test_renamed_shares_children() {
        let mut folder = FolderNode::new("old");
        folder.insert(FileNode::with_content("x.lua", "return 1"));
        let node = Node::Folder(folder);

        let renamed = node.renamed("new");
        assert_eq!(renamed.name(), "new");

        let before = node.as_folder().and_then(|f| f.child("x.lua")).unwrap();
        let after = renamed.as_folder().and_then(|f| f.child("x.lua")).unwrap();
        assert!(Arc::ptr_eq(before, after));
    }

    #[test]
    fn test_file_count() {
        let mut inner = FolderNode::new("inner");
        inner.insert(FileNode::new("a"));
        inner.insert(FileNode::new("b"));
        let mut outer = FolderNode::new("outer");
        outer.insert(inner);
        outer.insert(FileNode::new("c"));

        assert_eq!(Node::Folder(outer).file_count(), 3);
        assert_eq!(Node::file("solo").file_count(), 1);
    }
}
