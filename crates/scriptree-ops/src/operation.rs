//! Tree operation types.

use std::fmt;

use serde::{Deserialize, Serialize};

use scriptree_core::{EditorConfig, NodePath, Tree, TreeError};

use crate::{create, delete, move_op, rename, write};

/// Successful result of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// A new snapshot was produced.
    Changed(Tree),
    /// The operation was valid but changes nothing.
    NoOp,
}

impl Outcome {
    /// Check if this is a no-op.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    /// The new snapshot, if any.
    pub fn changed(self) -> Option<Tree> {
        match self {
            Self::Changed(tree) => Some(tree),
            Self::NoOp => None,
        }
    }

    /// The resulting snapshot, falling back to `current` on a no-op.
    pub fn into_tree(self, current: &Tree) -> Tree {
        match self {
            Self::Changed(tree) => tree,
            Self::NoOp => current.clone(),
        }
    }
}

/// A tree operation to be applied to a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TreeOperation {
    /// Create an empty file under a folder.
    CreateFile { parent: NodePath, name: String },
    /// Create an empty folder under a folder.
    CreateFolder { parent: NodePath, name: String },
    /// Delete a node and its subtree.
    Delete { path: NodePath },
    /// Replace a file's content.
    WriteContent { path: NodePath, content: String },
    /// Rename a node within its parent.
    Rename { path: NodePath, new_name: String },
    /// Move a node under another folder.
    Move { source: NodePath, target: NodePath },
}

impl TreeOperation {
    /// Create a file creation operation.
    pub fn create_file(parent: impl Into<NodePath>, name: impl Into<String>) -> Self {
        Self::CreateFile {
            parent: parent.into(),
            name: name.into(),
        }
    }

    /// Create a folder creation operation.
    pub fn create_folder(parent: impl Into<NodePath>, name: impl Into<String>) -> Self {
        Self::CreateFolder {
            parent: parent.into(),
            name: name.into(),
        }
    }

    /// Create a delete operation.
    pub fn delete(path: impl Into<NodePath>) -> Self {
        Self::Delete { path: path.into() }
    }

    /// Create a content write operation.
    pub fn write_content(path: impl Into<NodePath>, content: impl Into<String>) -> Self {
        Self::WriteContent {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Create a rename operation.
    pub fn rename(path: impl Into<NodePath>, new_name: impl Into<String>) -> Self {
        Self::Rename {
            path: path.into(),
            new_name: new_name.into(),
        }
    }

    /// Create a move operation.
    pub fn move_to(source: impl Into<NodePath>, target: impl Into<NodePath>) -> Self {
        Self::Move {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Apply this operation to a snapshot.
    pub fn apply(&self, tree: &Tree, config: &EditorConfig) -> Result<Outcome, TreeError> {
        let max = config.max_name_len;
        match self {
            Self::CreateFile { parent, name } => {
                create::create_node(tree, parent, scriptree_core::Node::file(name.as_str()), max)
            }
            Self::CreateFolder { parent, name } => {
                create::create_node(tree, parent, scriptree_core::Node::folder(name.as_str()), max)
            }
            Self::Delete { path } => delete::delete(tree, path),
            Self::WriteContent { path, content } => write::write_content(tree, path, content),
            Self::Rename { path, new_name } => rename::rename_with(tree, path, new_name, max),
            Self::Move { source, target } => move_op::move_node(tree, source, target),
        }
    }

    /// Path of the node this operation acts on.
    pub fn subject(&self) -> NodePath {
        match self {
            Self::CreateFile { parent, name } | Self::CreateFolder { parent, name } => {
                parent.join(name)
            }
            Self::Delete { path }
            | Self::WriteContent { path, .. }
            | Self::Rename { path, .. } => path.clone(),
            Self::Move { source, .. } => source.clone(),
        }
    }
}

impl fmt::Display for TreeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateFile { parent, name } => write!(f, "Create file '{}'", parent.join(name)),
            Self::CreateFolder { parent, name } => {
                write!(f, "Create folder '{}'", parent.join(name))
            }
            Self::Delete { path } => write!(f, "Delete '{path}'"),
            Self::WriteContent { path, content } => {
                write!(f, "Write {} bytes to '{path}'", content.len())
            }
            Self::Rename { path, new_name } => write!(f, "Rename '{path}' to '{new_name}'"),
            Self::Move { source, target } => write!(f, "Move '{source}' into '{target}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_display() {
        let op = TreeOperation::create_file("server", "main.lua");
        assert_eq!(op.to_string(), "Create file 'server/main.lua'");

        let op = TreeOperation::move_to("server/main.lua", "");
        assert_eq!(op.to_string(), "Move 'server/main.lua' into ''");
    }

    #[test]
    fn test_operation_serde_tagged() {
        let op = TreeOperation::rename("a.lua", "b.lua");
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "op": "rename", "path": "a.lua", "new_name": "b.lua" })
        );
        let back: TreeOperation = serde_json::from_value(json).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn test_apply_dispatches() {
        let config = EditorConfig::default();
        let tree = Tree::new();
        let tree = TreeOperation::create_folder("", "server")
            .apply(&tree, &config)
            .unwrap()
            .into_tree(&tree);
        assert!(tree.resolve(&NodePath::parse("server")).unwrap().is_folder());

        let outcome = TreeOperation::move_to("server", "").apply(&tree, &config).unwrap();
        assert!(outcome.is_noop());
    }

    #[test]
    fn test_subject() {
        assert_eq!(
            TreeOperation::create_folder("a", "b").subject(),
            NodePath::parse("a/b")
        );
        assert_eq!(TreeOperation::delete("x/y").subject(), NodePath::parse("x/y"));
    }
}
