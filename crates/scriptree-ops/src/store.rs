//! Owner of the current snapshot.

use scriptree_core::{EditorConfig, NodePath, Tree, TreeError};
use tracing::{debug, warn};

use crate::operation::{Outcome, TreeOperation};
use crate::upload::{UploadEntry, ingest_with};

/// Holds the canonical tree of one open project and applies operations to it.
///
/// Each applied change replaces the held snapshot and bumps the version.
/// Failed operations leave both untouched.
#[derive(Debug, Clone, Default)]
pub struct TreeStore {
    tree: Tree,
    version: u64,
    config: EditorConfig,
}

impl TreeStore {
    /// Create a store over an empty tree.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_tree(Tree::new(), config)
    }

    /// Create a store over an existing snapshot.
    pub fn with_tree(tree: Tree, config: EditorConfig) -> Self {
        Self {
            tree,
            version: 0,
            config,
        }
    }

    /// Borrow the current snapshot.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Clone the current snapshot (O(1)).
    pub fn snapshot(&self) -> Tree {
        self.tree.clone()
    }

    /// Number of changes applied so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Apply an operation to the current snapshot.
    pub fn apply(&mut self, op: &TreeOperation) -> Result<Outcome, TreeError> {
        let result = op.apply(&self.tree, &self.config);
        self.commit(&op.to_string(), result)
    }

    /// Ingest uploaded entries under `parent`.
    pub fn ingest(
        &mut self,
        parent: &NodePath,
        entries: &[UploadEntry],
    ) -> Result<Outcome, TreeError> {
        let result = ingest_with(&self.tree, parent, entries, &self.config);
        self.commit(&format!("Ingest {} entries into '{parent}'", entries.len()), result)
    }

    pub fn create_file(&mut self, parent: &NodePath, name: &str) -> Result<Outcome, TreeError> {
        self.apply(&TreeOperation::create_file(parent, name))
    }

    pub fn create_folder(&mut self, parent: &NodePath, name: &str) -> Result<Outcome, TreeError> {
        self.apply(&TreeOperation::create_folder(parent, name))
    }

    pub fn delete(&mut self, path: &NodePath) -> Result<Outcome, TreeError> {
        self.apply(&TreeOperation::delete(path))
    }

    pub fn write_content(&mut self, path: &NodePath, content: &str) -> Result<Outcome, TreeError> {
        self.apply(&TreeOperation::write_content(path, content))
    }

    pub fn rename(&mut self, path: &NodePath, new_name: &str) -> Result<Outcome, TreeError> {
        self.apply(&TreeOperation::rename(path, new_name))
    }

    pub fn move_node(
        &mut self,
        source: &NodePath,
        target: &NodePath,
    ) -> Result<Outcome, TreeError> {
        self.apply(&TreeOperation::move_to(source, target))
    }

    fn commit(
        &mut self,
        description: &str,
        result: Result<Outcome, TreeError>,
    ) -> Result<Outcome, TreeError> {
        match &result {
            Ok(Outcome::Changed(tree)) => {
                self.tree = tree.clone();
                self.version += 1;
                debug!(version = self.version, "{description}");
            }
            Ok(Outcome::NoOp) => debug!("{description}: no change"),
            Err(err) => warn!(kind = err.label(), "{description} failed: {err}"),
        }
        result
    }
}

impl From<Tree> for TreeStore {
    fn from(tree: Tree) -> Self {
        Self::with_tree(tree, EditorConfig::default())
    }
}
