//! Persistence boundary for scriptree.
//!
//! The editor never awaits persistence. Every committed snapshot is handed to
//! a [`SaveQueue`], whose background worker writes snapshots to an
//! [`ExternalSync`] store strictly in submission order.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use scriptree_core::Tree;
//! use scriptree_sync::{JsonDirStore, SaveQueue};
//!
//! # async fn demo() {
//! let store = Arc::new(JsonDirStore::new("projects"));
//! let (mut queue, _reports) = SaveQueue::spawn(store, "my-resource", true);
//! queue.submit(Tree::new());
//! queue.close().await;
//! # }
//! ```

mod document;
mod error;
mod fs_store;
mod memory;
mod queue;
mod sync;

pub use document::ProjectDocument;
pub use error::SyncError;
pub use fs_store::JsonDirStore;
pub use memory::MemoryStore;
pub use queue::{SaveQueue, SaveReport};
pub use sync::{BoxFuture, ExternalSync};
