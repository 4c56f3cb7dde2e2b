//! Tree operations engine for scriptree.
//!
//! Every operation here is a total function over a [`Tree`] snapshot: it
//! resolves its paths against that snapshot, validates every precondition,
//! and only then builds a new snapshot. A failed operation returns an error
//! and leaves the input untouched; an operation that would change nothing
//! returns [`Outcome::NoOp`].

mod archive;
mod create;
mod delete;
mod drag;
mod move_op;
mod operation;
mod rename;
mod store;
mod template;
mod upload;
mod write;

pub use archive::{
    ArchiveError, ArchiveOptions, archive_file_name, export, export_to, read_archive,
};
pub use create::{create_file, create_folder, create_node};
pub use delete::delete;
pub use drag::{DragReparentController, DropCommand, DropTarget, IgnoredDrop, drop_command};
pub use move_op::{effective_target, move_node};
pub use operation::{Outcome, TreeOperation};
pub use rename::{rename, rename_with};
pub use store::TreeStore;
pub use template::scaffold;
pub use upload::{UploadEntry, collect_dir, ingest, ingest_with};
pub use write::{read_content, write_content};

pub use scriptree_core::{NodePath, Tree, TreeError};
