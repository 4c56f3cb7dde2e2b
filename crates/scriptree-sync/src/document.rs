//! Stored project document.

use serde::{Deserialize, Serialize};

use scriptree_core::Tree;

/// The persisted shape of a project: `{ "fileStructure": { ... } }`.
///
/// Unknown top-level fields are ignored on read, and a missing or null
/// structure loads as an empty tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDocument {
    #[serde(rename = "fileStructure", default)]
    pub file_structure: Tree,
}

impl ProjectDocument {
    pub fn new(file_structure: Tree) -> Self {
        Self { file_structure }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl From<Tree> for ProjectDocument {
    fn from(tree: Tree) -> Self {
        Self::new(tree)
    }
}
