//! Editing session for scriptree.
//!
//! An [`EditorSession`] is the single writer for one open project. It applies
//! tree operations synchronously, keeps the view state (selection, edit
//! buffer, expanded folders) pointing at the right nodes as they move, and
//! hands every new snapshot to a background save queue.

mod error;
mod session;
mod view;

pub use error::SessionError;
pub use session::EditorSession;
pub use view::{ExpandedFolders, VisibleRow, visible_rows};
