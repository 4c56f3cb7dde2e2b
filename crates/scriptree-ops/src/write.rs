//! File content access.

use scriptree_core::{FileNode, NodePath, NodeRef, Tree, TreeError};
use tracing::debug;

use crate::operation::Outcome;

/// Read the content of the file at `path`.
pub fn read_content<'a>(tree: &'a Tree, path: &NodePath) -> Result<&'a str, TreeError> {
    match tree.resolve(path)? {
        NodeRef::File(file) => Ok(&file.content),
        NodeRef::Folder(_) => Err(TreeError::not_a_file(path)),
    }
}

/// Replace the content of the file at `path`.
///
/// Structure is left alone; writing identical content is a no-op.
pub fn write_content(tree: &Tree, path: &NodePath, content: &str) -> Result<Outcome, TreeError> {
    if read_content(tree, path)? == content {
        return Ok(Outcome::NoOp);
    }
    let (Some(parent), Some(name)) = (path.parent(), path.name()) else {
        return Err(TreeError::not_a_file(path));
    };

    debug!(path = %path, bytes = content.len(), "writing content");
    let next = tree.update_folder(&parent, |folder| {
        folder.insert(FileNode::with_content(name, content));
        Ok(())
    })?;
    Ok(Outcome::Changed(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create::{create_file, create_folder};

    fn tree() -> Tree {
        let tree = Tree::new();
        let tree = create_folder(&tree, &NodePath::root(), "src").unwrap().into_tree(&tree);
        create_file(&tree, &NodePath::parse("src"), "a.lua").unwrap().into_tree(&tree)
    }

    #[test]
    fn test_write_then_read() {
        let tree = tree();
        let path = NodePath::parse("src/a.lua");
        let next = write_content(&tree, &path, "return 42").unwrap().into_tree(&tree);
        assert_eq!(read_content(&next, &path).unwrap(), "return 42");
        assert_eq!(read_content(&tree, &path).unwrap(), "");
    }

    #[test]
    fn test_write_same_content_is_noop() {
        let tree = tree();
        let outcome = write_content(&tree, &NodePath::parse("src/a.lua"), "").unwrap();
        assert!(outcome.is_noop());
    }

    #[test]
    fn test_write_to_folder_is_not_a_file() {
        let tree = tree();
        let err = write_content(&tree, &NodePath::parse("src"), "x").unwrap_err();
        assert!(matches!(err, TreeError::NotAFile { .. }));
        let err = write_content(&tree, &NodePath::root(), "x").unwrap_err();
        assert!(matches!(err, TreeError::NotAFile { .. }));
        assert!(matches!(
            read_content(&tree, &NodePath::parse("src")),
            Err(TreeError::NotAFile { .. })
        ));
    }

    #[test]
    fn test_write_missing() {
        let err = write_content(&tree(), &NodePath::parse("src/b.lua"), "x").unwrap_err();
        assert!(matches!(err, TreeError::NotFound { .. }));
    }
}
