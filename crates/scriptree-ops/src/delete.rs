//! Node deletion.

use scriptree_core::{NodePath, Tree, TreeError};
use tracing::debug;

use crate::operation::Outcome;

/// Delete the node at `path` together with its whole subtree.
///
/// The root cannot be deleted. Clearing a selection that pointed into the
/// removed subtree is the caller's job.
pub fn delete(tree: &Tree, path: &NodePath) -> Result<Outcome, TreeError> {
    let node = tree.node_arc(path)?;
    let (Some(parent), Some(name)) = (path.parent(), path.name()) else {
        return Err(TreeError::invalid_path(path));
    };

    debug!(path = %path, files = node.file_count(), "deleting subtree");
    let next = tree.update_folder(&parent, |folder| {
        folder.children.remove(name);
        Ok(())
    })?;
    Ok(Outcome::Changed(next))
}
