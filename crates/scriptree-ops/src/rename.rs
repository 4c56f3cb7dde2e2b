//! Rename operation.

use scriptree_core::{MAX_NAME_LEN, NodePath, Tree, TreeError, validate_name};
use tracing::debug;

use crate::operation::Outcome;

/// Rename the node at `path` within its parent.
pub fn rename(tree: &Tree, path: &NodePath, new_name: &str) -> Result<Outcome, TreeError> {
    rename_with(tree, path, new_name, MAX_NAME_LEN)
}

/// Rename with an explicit name length limit.
///
/// Equivalent to moving the node to a sibling path: the subtree is carried
/// over by reference. Renaming to the current name is a no-op.
pub fn rename_with(
    tree: &Tree,
    path: &NodePath,
    new_name: &str,
    max_name_len: usize,
) -> Result<Outcome, TreeError> {
    let node = tree.node_arc(path)?;
    let (Some(parent), Some(old_name)) = (path.parent(), path.name()) else {
        return Err(TreeError::invalid_path(path));
    };

    validate_name(new_name, max_name_len)?;
    if old_name == new_name {
        return Ok(Outcome::NoOp);
    }

    let siblings = tree.resolve(&parent)?;
    if siblings.as_folder().is_some_and(|f| f.contains(new_name)) {
        return Err(TreeError::name_conflict(&parent, new_name));
    }

    debug!(path = %path, new_name, "renaming node");
    let next = tree.update_folder(&parent, |folder| {
        folder.children.remove(old_name);
        folder.insert(node.renamed(new_name));
        Ok(())
    })?;
    Ok(Outcome::Changed(next))
}
