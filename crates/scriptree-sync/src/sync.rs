//! The store trait.

use std::future::Future;
use std::pin::Pin;

use scriptree_core::Tree;

use crate::error::SyncError;

/// Type alias for boxed futures returned by store methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A persistent store holding one document per project.
///
/// Implementations must apply saves for the same project in the order they
/// are called; [`crate::SaveQueue`] guarantees it never issues two at once.
pub trait ExternalSync: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Load a project's tree, or `None` if the project has never been saved.
    fn load<'a>(&'a self, project_id: &'a str) -> BoxFuture<'a, Result<Option<Tree>, SyncError>>;

    /// Replace a project's stored tree.
    fn save<'a>(
        &'a self,
        project_id: &'a str,
        tree: &'a Tree,
    ) -> BoxFuture<'a, Result<(), SyncError>>;
}
