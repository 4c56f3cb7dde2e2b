//! Flattened tree view and folder expansion state.

use std::collections::HashSet;

use scriptree_core::{FolderNode, NodeKind, NodePath, Tree};

/// Set of expanded folder paths.
#[derive(Debug, Clone, Default)]
pub struct ExpandedFolders {
    paths: HashSet<NodePath>,
}

impl ExpandedFolders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a folder and return whether it is now expanded.
    pub fn toggle(&mut self, path: &NodePath) -> bool {
        if self.paths.remove(path) {
            false
        } else {
            self.paths.insert(path.clone());
            true
        }
    }

    pub fn expand(&mut self, path: &NodePath) {
        if !path.is_root() {
            self.paths.insert(path.clone());
        }
    }

    pub fn collapse_all(&mut self) {
        self.paths.clear();
    }

    /// The root is always expanded.
    pub fn is_expanded(&self, path: &NodePath) -> bool {
        path.is_root() || self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Drop every entry at or below `path`.
    pub(crate) fn forget(&mut self, path: &NodePath) {
        self.paths.retain(|p| !p.starts_with(path));
    }

    /// Re-point every entry at or below `from` to live under `to`.
    pub(crate) fn rebase(&mut self, from: &NodePath, to: &NodePath) {
        self.paths = self
            .paths
            .drain()
            .map(|p| p.rebase(from, to).unwrap_or(p))
            .collect();
    }
}

/// One row of the flattened tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub path: NodePath,
    pub name: String,
    pub kind: NodeKind,
    /// Root children are at depth 0.
    pub depth: usize,
    /// Only meaningful for folders.
    pub expanded: bool,
}

/// Flatten `tree` in display order, descending only into expanded folders.
pub fn visible_rows(tree: &Tree, expanded: &ExpandedFolders) -> Vec<VisibleRow> {
    let mut rows = Vec::new();
    flatten_folder(tree.root(), &NodePath::root(), 0, expanded, &mut rows);
    rows
}

fn flatten_folder(
    folder: &FolderNode,
    path: &NodePath,
    depth: usize,
    expanded: &ExpandedFolders,
    rows: &mut Vec<VisibleRow>,
) {
    for child in folder.sorted_children() {
        let child_path = path.join(child.name());
        let is_expanded = child.is_folder() && expanded.is_expanded(&child_path);

        rows.push(VisibleRow {
            path: child_path.clone(),
            name: child.name().to_string(),
            kind: child.kind(),
            depth,
            expanded: is_expanded,
        });

        if let (true, Some(inner)) = (is_expanded, child.as_folder()) {
            flatten_folder(inner, &child_path, depth + 1, expanded, rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptree_core::FileNode;

    fn project() -> Tree {
        let mut lib = FolderNode::new("lib");
        lib.insert(FileNode::new("util.lua"));
        let mut server = FolderNode::new("server");
        server.insert(FileNode::new("main.lua"));
        server.insert(lib);
        let mut root = FolderNode::default();
        root.insert(FileNode::new("fxmanifest.lua"));
        root.insert(server);
        root.insert(FolderNode::new("client"));
        Tree::from_root(root)
    }

    fn paths(rows: &[VisibleRow]) -> Vec<String> {
        rows.iter().map(|r| r.path.to_string()).collect()
    }

    #[test]
    fn test_collapsed_tree_shows_top_level() {
        let rows = visible_rows(&project(), &ExpandedFolders::new());
        assert_eq!(paths(&rows), vec!["client", "server", "fxmanifest.lua"]);
        assert!(rows.iter().all(|r| r.depth == 0 && !r.expanded));
    }

    #[test]
    fn test_expanded_folders_are_flattened() {
        let mut expanded = ExpandedFolders::new();
        assert!(expanded.toggle(&NodePath::parse("server")));
        expanded.expand(&NodePath::parse("server/lib"));

        let rows = visible_rows(&project(), &expanded);
        assert_eq!(
            paths(&rows),
            vec![
                "client",
                "server",
                "server/lib",
                "server/lib/util.lua",
                "server/main.lua",
                "fxmanifest.lua"
            ]
        );
        assert_eq!(rows[3].depth, 2);

        // A collapsed ancestor hides expanded descendants.
        assert!(!expanded.toggle(&NodePath::parse("server")));
        assert_eq!(visible_rows(&project(), &expanded).len(), 3);
    }

    #[test]
    fn test_rebase_and_forget() {
        let mut expanded = ExpandedFolders::new();
        expanded.expand(&NodePath::parse("server"));
        expanded.expand(&NodePath::parse("server/lib"));
        expanded.expand(&NodePath::parse("client"));

        expanded.rebase(&NodePath::parse("server"), &NodePath::parse("backend"));
        assert!(expanded.is_expanded(&NodePath::parse("backend/lib")));
        assert!(!expanded.is_expanded(&NodePath::parse("server")));

        expanded.forget(&NodePath::parse("backend"));
        assert_eq!(expanded.len(), 1);
        expanded.collapse_all();
        assert!(expanded.is_empty());
    }
}
