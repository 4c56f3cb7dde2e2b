//! File and folder creation.

use scriptree_core::{MAX_NAME_LEN, Node, NodePath, Tree, TreeError, resolve_folder, validate_name};
use tracing::debug;

use crate::operation::Outcome;

/// Create an empty file named `name` under the folder at `parent`.
pub fn create_file(tree: &Tree, parent: &NodePath, name: &str) -> Result<Outcome, TreeError> {
    create_node(tree, parent, Node::file(name), MAX_NAME_LEN)
}

/// Create an empty folder named `name` under the folder at `parent`.
pub fn create_folder(tree: &Tree, parent: &NodePath, name: &str) -> Result<Outcome, TreeError> {
    create_node(tree, parent, Node::folder(name), MAX_NAME_LEN)
}

/// Insert `node` under the folder at `parent`.
///
/// Fails with `InvalidName` for a rejected name, `NotFound`/`InvalidPath` when
/// `parent` is not a folder, and `NameConflict` when a sibling already owns
/// the name. Never overwrites.
pub fn create_node(
    tree: &Tree,
    parent: &NodePath,
    node: Node,
    max_name_len: usize,
) -> Result<Outcome, TreeError> {
    validate_name(node.name(), max_name_len)?;

    let folder = resolve_folder(tree, parent)?;
    if folder.contains(node.name()) {
        return Err(TreeError::name_conflict(parent, node.name()));
    }

    debug!(parent = %parent, name = node.name(), kind = %node.kind(), "creating node");
    let next = tree.update_folder(parent, |folder| {
        folder.insert(node);
        Ok(())
    })?;
    Ok(Outcome::Changed(next))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> NodePath {
        NodePath::root()
    }

    #[test]
    fn test_create_file_and_folder() {
        let tree = Tree::new();
        let tree = create_folder(&tree, &root(), "server").unwrap().into_tree(&tree);
        let tree = create_file(&tree, &NodePath::parse("server"), "main.lua")
            .unwrap()
            .into_tree(&tree);

        let file = tree.resolve(&NodePath::parse("server/main.lua")).unwrap();
        assert_eq!(file.as_file().unwrap().content, "");
        let folder = tree.resolve(&NodePath::parse("server")).unwrap();
        assert_eq!(folder.as_folder().unwrap().child_count(), 1);
    }

    #[test]
    fn test_create_conflict_leaves_tree_unchanged() {
        let tree = Tree::new();
        let tree = create_file(&tree, &root(), "a.lua").unwrap().into_tree(&tree);
        let before = tree.clone();

        let err = create_file(&tree, &root(), "a.lua").unwrap_err();
        assert!(matches!(err, TreeError::NameConflict { .. }));
        assert_eq!(tree, before);

        // Same name, different kind is still a conflict.
        let err = create_folder(&tree, &root(), "a.lua").unwrap_err();
        assert!(matches!(err, TreeError::NameConflict { .. }));
    }

    #[test]
    fn test_create_under_file_is_invalid_path() {
        let tree = Tree::new();
        let tree = create_file(&tree, &root(), "a.lua").unwrap().into_tree(&tree);
        let err = create_file(&tree, &NodePath::parse("a.lua"), "b.lua").unwrap_err();
        assert!(matches!(err, TreeError::InvalidPath { .. }));
    }

    #[test]
    fn test_create_under_missing_parent() {
        let tree = Tree::new();
        let err = create_folder(&tree, &NodePath::parse("nope"), "x").unwrap_err();
        assert!(matches!(err, TreeError::NotFound { .. }));
    }

    #[test]
    fn test_create_rejects_bad_names() {
        let tree = Tree::new();
        for name in ["", "a/b", "..", " x"] {
            let err = create_file(&tree, &root(), name).unwrap_err();
            assert!(matches!(err, TreeError::InvalidName { .. }), "{name:?}");
        }
    }
}
