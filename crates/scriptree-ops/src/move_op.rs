//! Move (reparent) operation.

use scriptree_core::{NodePath, NodeRef, Tree, TreeError};
use tracing::debug;

use crate::operation::Outcome;

/// Folder a move into `target` actually lands in.
///
/// A file target falls back to the file's parent folder; this mirrors what
/// dropping something onto a file in the editor does.
pub fn effective_target(tree: &Tree, target: &NodePath) -> Result<NodePath, TreeError> {
    match tree.resolve(target)? {
        NodeRef::Folder(_) => Ok(target.clone()),
        NodeRef::File(_) => target.parent().ok_or_else(|| TreeError::invalid_path(target)),
    }
}

/// Move the node at `source` under the folder at `target`.
///
/// Preconditions are checked in order against the current snapshot:
/// both paths resolve (`NotFound`), the source is not the root
/// (`InvalidPath`), the effective target is not the source or inside it
/// (`Cycle`), the effective target is not already the source's parent
/// (`NoOp`), and the target has no child of the same name (`NameConflict`).
/// The subtree is detached and re-attached by reference.
pub fn move_node(tree: &Tree, source: &NodePath, target: &NodePath) -> Result<Outcome, TreeError> {
    let node = tree.node_arc(source)?;
    let target = effective_target(tree, target)?;
    let (Some(source_parent), Some(name)) = (source.parent(), source.name()) else {
        return Err(TreeError::invalid_path(source));
    };

    if target.starts_with(source) {
        return Err(TreeError::Cycle {
            moved: source.clone(),
            target,
        });
    }

    if target == source_parent {
        return Ok(Outcome::NoOp);
    }

    let destination = tree.resolve(&target)?;
    if destination.as_folder().is_some_and(|f| f.contains(name)) {
        return Err(TreeError::name_conflict(&target, name));
    }

    debug!(source = %source, target = %target, "moving node");
    let detached = tree.update_folder(&source_parent, |folder| {
        folder.children.remove(name);
        Ok(())
    })?;
    let attached = detached.update_folder(&target, |folder| {
        folder.insert(node);
        Ok(())
    })?;
    Ok(Outcome::Changed(attached))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create::{create_file, create_folder};

    fn p(path: &str) -> NodePath {
        NodePath::parse(path)
    }

    fn tree() -> Tree {
        let mut tree = Tree::new();
        for (parent, name, folder) in [
            ("", "server", true),
            ("server", "lib", true),
            ("server/lib", "util.lua", false),
            ("server", "main.lua", false),
            ("", "client", true),
            ("", "readme.md", false),
        ] {
            let outcome = if folder {
                create_folder(&tree, &p(parent), name)
            } else {
                create_file(&tree, &p(parent), name)
            };
            tree = outcome.unwrap().into_tree(&tree);
        }
        tree
    }

    #[test]
    fn test_move_file_to_root() {
        let tree = tree();
        let next = move_node(&tree, &p("server/main.lua"), &NodePath::root())
            .unwrap()
            .into_tree(&tree);
        assert!(next.resolve(&p("main.lua")).is_ok());
        assert!(next.resolve(&p("server/main.lua")).is_err());
    }

    #[test]
    fn test_move_folder_into_sibling() {
        let tree = tree();
        let next = move_node(&tree, &p("server/lib"), &p("client"))
            .unwrap()
            .into_tree(&tree);
        assert!(next.resolve(&p("client/lib/util.lua")).is_ok());
    }

    #[test]
    fn test_move_onto_file_targets_its_parent() {
        let tree = tree();
        let next = move_node(&tree, &p("server/lib/util.lua"), &p("readme.md"))
            .unwrap()
            .into_tree(&tree);
        assert!(next.resolve(&p("util.lua")).is_ok());
    }

    #[test]
    fn test_move_into_self_or_descendant_is_cycle() {
        let tree = tree();
        for target in ["server", "server/lib", "server/lib/util.lua", "server/main.lua"] {
            let err = move_node(&tree, &p("server"), &p(target)).unwrap_err();
            assert!(matches!(err, TreeError::Cycle { .. }), "{target}");
        }
    }

    #[test]
    fn test_move_to_current_parent_is_noop() {
        let tree = tree();
        assert!(move_node(&tree, &p("server/main.lua"), &p("server")).unwrap().is_noop());
        assert!(move_node(&tree, &p("client"), &NodePath::root()).unwrap().is_noop());
        // Dropping a file onto a sibling file lands in the same parent.
        assert!(move_node(&tree, &p("server/main.lua"), &p("server/main.lua")).unwrap().is_noop());
    }

    #[test]
    fn test_move_name_conflict() {
        let tree = tree();
        let tree = create_file(&tree, &p("client"), "main.lua").unwrap().into_tree(&tree);
        let err = move_node(&tree, &p("server/main.lua"), &p("client")).unwrap_err();
        assert!(matches!(err, TreeError::NameConflict { .. }));
    }

    #[test]
    fn test_move_missing_paths() {
        let tree = tree();
        assert!(matches!(
            move_node(&tree, &p("ghost"), &p("client")),
            Err(TreeError::NotFound { .. })
        ));
        assert!(matches!(
            move_node(&tree, &p("readme.md"), &p("ghost")),
            Err(TreeError::NotFound { .. })
        ));
        assert!(matches!(
            move_node(&tree, &NodePath::root(), &p("client")),
            Err(TreeError::InvalidPath { .. })
        ));
    }
}
