//! In-memory store.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use scriptree_core::Tree;
use tracing::trace;

use crate::document::ProjectDocument;
use crate::error::SyncError;
use crate::sync::{BoxFuture, ExternalSync};

/// A store that keeps serialized documents in memory.
///
/// Documents go through the same JSON encoding as on disk, so a load returns
/// an independent copy. Saves can be slowed down or made to fail, and every
/// accepted save is appended to a log.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: DashMap<String, String>,
    log: Mutex<Vec<(String, Tree)>>,
    failures: AtomicUsize,
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every save by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Seed a project document.
    pub fn insert(&self, project_id: impl Into<String>, tree: &Tree) -> Result<(), SyncError> {
        let text = ProjectDocument::new(tree.clone()).to_json()?;
        self.documents.insert(project_id.into(), text);
        Ok(())
    }

    /// Make the next `count` saves fail.
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    /// Trees accepted so far, in the order they were saved.
    pub fn saved(&self, project_id: &str) -> Vec<Tree> {
        self.log
            .lock()
            .map(|log| {
                log.iter()
                    .filter(|(id, _)| id == project_id)
                    .map(|(_, tree)| tree.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn contains(&self, project_id: &str) -> bool {
        self.documents.contains_key(project_id)
    }

    fn take_failure(&self) -> bool {
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl ExternalSync for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load<'a>(&'a self, project_id: &'a str) -> BoxFuture<'a, Result<Option<Tree>, SyncError>> {
        Box::pin(async move {
            let Some(text) = self.documents.get(project_id).map(|entry| entry.value().clone())
            else {
                return Ok(None);
            };
            Ok(Some(ProjectDocument::from_json(&text)?.file_structure))
        })
    }

    fn save<'a>(
        &'a self,
        project_id: &'a str,
        tree: &'a Tree,
    ) -> BoxFuture<'a, Result<(), SyncError>> {
        Box::pin(async move {
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            if self.take_failure() {
                return Err(SyncError::Backend("injected failure".to_string()));
            }

            let text = ProjectDocument::new(tree.clone()).to_json()?;
            self.documents.insert(project_id.to_string(), text);
            if let Ok(mut log) = self.log.lock() {
                log.push((project_id.to_string(), tree.clone()));
            }
            trace!(project = project_id, "document stored");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptree_core::{FileNode, FolderNode};

    fn tree_with(name: &str) -> Tree {
        let mut root = FolderNode::default();
        root.insert(FileNode::with_content(name, "x"));
        Tree::from_root(root)
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.load("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemoryStore::new();
        let tree = tree_with("a.lua");
        store.save("p", &tree).await.unwrap();

        assert_eq!(store.load("p").await.unwrap(), Some(tree.clone()));
        assert_eq!(store.saved("p"), vec![tree]);
        assert!(store.saved("other").is_empty());
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MemoryStore::new();
        store.fail_next(1);
        assert!(matches!(
            store.save("p", &Tree::new()).await,
            Err(SyncError::Backend(_))
        ));
        assert!(!store.contains("p"));
        assert!(store.save("p", &Tree::new()).await.is_ok());
    }
}
