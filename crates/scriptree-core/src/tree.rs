//! Immutable tree snapshots with structural sharing.

use std::sync::Arc;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::node::{FolderNode, Node, NodeRef};
use crate::path::{NodePath, resolve};

/// Summary statistics for a tree snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Total number of files.
    pub total_files: u64,
    /// Total number of folders (root excluded).
    pub total_folders: u64,
    /// Total content size in bytes.
    pub total_bytes: u64,
    /// Deepest node depth (root children are at depth 1).
    pub max_depth: u32,
    /// Largest file (path, size).
    pub largest_file: Option<(NodePath, u64)>,
}

impl TreeStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats with a file entry.
    pub fn record_file(&mut self, path: NodePath, size: u64) {
        self.total_files += 1;
        self.total_bytes += size;
        self.max_depth = self.max_depth.max(path.depth() as u32);

        if self.largest_file.as_ref().is_none_or(|(_, s)| size > *s) {
            self.largest_file = Some((path, size));
        }
    }

    /// Record a folder.
    pub fn record_folder(&mut self, depth: u32) {
        self.total_folders += 1;
        self.max_depth = self.max_depth.max(depth);
    }
}

/// One immutable version of the whole tree.
///
/// Cloning is O(1). Mutations go through [`Tree::update_folder`], which
/// rebuilds only the folders between the root and the edited folder and
/// shares every other subtree with the previous snapshot, so holders of an
/// older snapshot never observe a change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    root: Arc<FolderNode>,
}

impl Tree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree from a root folder. The root's name is cleared.
    pub fn from_root(mut root: FolderNode) -> Self {
        root.name = CompactString::default();
        Self {
            root: Arc::new(root),
        }
    }

    /// Get the root folder.
    pub fn root(&self) -> &FolderNode {
        &self.root
    }

    /// Check if the tree has no nodes besides the root.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Check whether two snapshots are the same version (pointer identity).
    pub fn ptr_eq(&self, other: &Tree) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    /// Resolve a path in this snapshot.
    pub fn resolve(&self, path: &NodePath) -> Result<NodeRef<'_>, TreeError> {
        resolve(self, path)
    }

    /// Get the shared pointer of a non-root node, for re-attaching elsewhere.
    pub fn node_arc(&self, path: &NodePath) -> Result<Arc<Node>, TreeError> {
        let (parent, name) = match (path.parent(), path.name()) {
            (Some(parent), Some(name)) => (parent, name),
            _ => return Err(TreeError::invalid_path(path)),
        };
        match self.resolve(&parent)? {
            NodeRef::Folder(folder) => folder
                .child(name)
                .cloned()
                .ok_or_else(|| TreeError::not_found(path)),
            NodeRef::File(_) => Err(TreeError::invalid_path(path)),
        }
    }

    /// Produce a new snapshot in which the folder at `folder` has been edited.
    ///
    /// `edit` receives a private copy of that folder; every ancestor is copied
    /// once and every untouched sibling subtree is shared. If `edit` fails, the
    /// error is returned and no snapshot is produced.
    pub fn update_folder<F>(&self, folder: &NodePath, edit: F) -> Result<Tree, TreeError>
    where
        F: FnOnce(&mut FolderNode) -> Result<(), TreeError>,
    {
        let root = rebuild(&self.root, folder.segments(), folder, edit)?;
        Ok(Self {
            root: Arc::new(root),
        })
    }

    /// Depth-first, pre-order walk in display order (root excluded).
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.root)
    }

    /// Compute summary statistics.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::new();
        for (path, node) in self.walk() {
            match node {
                NodeRef::File(file) => stats.record_file(path, file.content.len() as u64),
                NodeRef::Folder(_) => stats.record_folder(path.depth() as u32),
            }
        }
        stats
    }
}

fn rebuild<F>(
    folder: &FolderNode,
    segments: &[CompactString],
    full: &NodePath,
    edit: F,
) -> Result<FolderNode, TreeError>
where
    F: FnOnce(&mut FolderNode) -> Result<(), TreeError>,
{
    let Some((head, rest)) = segments.split_first() else {
        let mut copy = folder.clone();
        edit(&mut copy)?;
        return Ok(copy);
    };

    let child = folder.child(head).ok_or_else(|| TreeError::not_found(full))?;
    let Node::Folder(child_folder) = &**child else {
        return Err(TreeError::invalid_path(full));
    };

    let rebuilt = rebuild(child_folder, rest, full, edit)?;
    let mut copy = folder.clone();
    copy.children.insert(head.clone(), Arc::new(Node::Folder(rebuilt)));
    Ok(copy)
}

/// Iterator over `(path, node)` pairs, depth-first pre-order.
///
/// Siblings are visited in display order (folders first, then by name).
pub struct Walk<'a> {
    stack: Vec<(NodePath, &'a Node)>,
}

impl<'a> Walk<'a> {
    fn new(root: &'a FolderNode) -> Self {
        let mut walk = Self { stack: Vec::new() };
        walk.push_children(&NodePath::root(), root);
        walk
    }

    fn push_children(&mut self, parent: &NodePath, folder: &'a FolderNode) {
        // Reverse so the first child in display order is popped first.
        for child in folder.sorted_children().into_iter().rev() {
            self.stack.push((parent.join(child.name()), &**child));
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (NodePath, NodeRef<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        if let Node::Folder(folder) = node {
            self.push_children(&path, folder);
        }
        Some((path, node.view()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::FileNode;

    fn sample() -> Tree {
        let mut client = FolderNode::new("client");
        client.insert(FileNode::with_content("cl.lua", "abc"));
        let mut server = FolderNode::new("server");
        server.insert(FileNode::with_content("sv.lua", "12345"));
        let mut root = FolderNode::default();
        root.insert(server);
        root.insert(client);
        root.insert(FileNode::new("readme.md"));
        Tree::from_root(root)
    }

    #[test]
    fn test_walk_is_preorder_display_order() {
        let tree = sample();
        let paths: Vec<String> = tree.walk().map(|(p, _)| p.to_string()).collect();
        assert_eq!(
            paths,
            vec!["client", "client/cl.lua", "server", "server/sv.lua", "readme.md"]
        );
    }

    #[test]
    fn test_update_folder_shares_untouched_subtrees() {
        let tree = sample();
        let next = tree
            .update_folder(&NodePath::parse("server"), |folder| {
                folder.insert(FileNode::new("new.lua"));
                Ok(())
            })
            .unwrap();

        assert!(!tree.ptr_eq(&next));
        let before = tree.root().child("client").unwrap();
        let after = next.root().child("client").unwrap();
        assert!(Arc::ptr_eq(before, after));

        // The previous snapshot is untouched.
        assert!(tree.resolve(&NodePath::parse("server/new.lua")).is_err());
        assert!(next.resolve(&NodePath::parse("server/new.lua")).is_ok());
    }

    #[test]
    fn test_update_folder_failure_leaves_no_snapshot() {
        let tree = sample();
        let result = tree.update_folder(&NodePath::parse("readme.md"), |_| Ok(()));
        assert!(matches!(result, Err(TreeError::InvalidPath { .. })));

        let result = tree.update_folder(&NodePath::parse("missing"), |_| Ok(()));
        assert!(matches!(result, Err(TreeError::NotFound { .. })));
    }

    #[test]
    fn test_node_arc() {
        let tree = sample();
        let node = tree.node_arc(&NodePath::parse("server/sv.lua")).unwrap();
        assert_eq!(node.name(), "sv.lua");
        assert!(tree.node_arc(&NodePath::root()).is_err());
    }

    #[test]
    fn test_stats() {
        let stats = sample().stats();
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_folders, 2);
        assert_eq!(stats.total_bytes, 8);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(
            stats.largest_file,
            Some((NodePath::parse("server/sv.lua"), 5))
        );
    }
}
