//! The editing session.

use std::sync::Arc;

use scriptree_core::{EditorConfig, NodeKind, NodePath, NodeRef, Tree, TreeError};
use scriptree_ops::{
    ArchiveOptions, DragReparentController, DropCommand, DropTarget, Outcome, TreeStore,
    UploadEntry, archive_file_name, effective_target, export,
};
use scriptree_sync::{ExternalSync, SaveQueue, SaveReport};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::SessionError;
use crate::view::{ExpandedFolders, VisibleRow, visible_rows};

/// One open project.
///
/// Mutations apply synchronously to the in-memory tree; the new snapshot is
/// then queued for saving and never awaited. View state is updated in the
/// same call so it always refers to nodes of the current snapshot.
pub struct EditorSession {
    project_id: String,
    project_name: String,
    store: TreeStore,
    saves: SaveQueue,
    reports: mpsc::UnboundedReceiver<SaveReport>,
    selection: Option<NodePath>,
    buffer: String,
    dirty: bool,
    expanded: ExpandedFolders,
    current_path: NodePath,
    drag: DragReparentController,
}

impl EditorSession {
    /// Load a project from `sync` and start its save queue.
    ///
    /// A project that was never saved opens as an empty tree.
    pub async fn open<S>(
        sync: Arc<S>,
        project_id: impl Into<String>,
        config: EditorConfig,
    ) -> Result<Self, SessionError>
    where
        S: ExternalSync + ?Sized + 'static,
    {
        let project_id = project_id.into();
        let tree = sync.load(&project_id).await?.unwrap_or_default();
        let stats = tree.stats();
        info!(
            project = %project_id,
            store = sync.name(),
            files = stats.total_files,
            folders = stats.total_folders,
            "project opened"
        );

        let (saves, reports) = SaveQueue::spawn(sync, project_id.clone(), config.coalesce_saves);
        Ok(Self {
            project_name: project_id.clone(),
            project_id,
            store: TreeStore::with_tree(tree, config),
            saves,
            reports,
            selection: None,
            buffer: String::new(),
            dirty: false,
            expanded: ExpandedFolders::new(),
            current_path: NodePath::root(),
            drag: DragReparentController::new(),
        })
    }

    /// Set the display name used for the archive file.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = name.into();
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Current snapshot.
    pub fn tree(&self) -> &Tree {
        self.store.tree()
    }

    /// Number of changes applied since the project was opened.
    pub fn version(&self) -> u64 {
        self.store.version()
    }

    pub fn config(&self) -> &EditorConfig {
        self.store.config()
    }

    // ==================== Mutations ====================

    pub fn create_file(&mut self, parent: &NodePath, name: &str) -> Result<Outcome, SessionError> {
        let result = self.store.create_file(parent, name.trim());
        self.after_create(parent, result)
    }

    pub fn create_folder(
        &mut self,
        parent: &NodePath,
        name: &str,
    ) -> Result<Outcome, SessionError> {
        let result = self.store.create_folder(parent, name.trim());
        self.after_create(parent, result)
    }

    /// Create under the creation cursor.
    pub fn create_here(&mut self, kind: NodeKind, name: &str) -> Result<Outcome, SessionError> {
        let parent = self.current_path.clone();
        match kind {
            NodeKind::File => self.create_file(&parent, name),
            NodeKind::Folder => self.create_folder(&parent, name),
        }
    }

    fn after_create(
        &mut self,
        parent: &NodePath,
        result: Result<Outcome, TreeError>,
    ) -> Result<Outcome, SessionError> {
        let outcome = self.persist(result)?;
        if !outcome.is_noop() {
            self.expanded.expand(parent);
        }
        Ok(outcome)
    }

    /// Delete a node. Selection, cursor and expansion under it are dropped.
    pub fn delete(&mut self, path: &NodePath) -> Result<Outcome, SessionError> {
        let result = self.store.delete(path);
        let outcome = self.persist(result)?;
        if outcome.is_noop() {
            return Ok(outcome);
        }

        if self.selection.as_ref().is_some_and(|s| s.starts_with(path)) {
            debug!(path = %path, "selected file removed");
            self.clear_selection();
        }
        if self.current_path.starts_with(path) {
            self.current_path = NodePath::root();
        }
        self.expanded.forget(path);
        Ok(outcome)
    }

    /// Rename a node. View state follows it.
    pub fn rename(&mut self, path: &NodePath, new_name: &str) -> Result<Outcome, SessionError> {
        let new_name = new_name.trim();
        let result = self.store.rename(path, new_name);
        let outcome = self.persist(result)?;
        if !outcome.is_noop() {
            self.follow(path, &path.with_name(new_name));
        }
        Ok(outcome)
    }

    /// Move a node under `target`; a file target means its parent folder.
    pub fn move_node(
        &mut self,
        source: &NodePath,
        target: &NodePath,
    ) -> Result<Outcome, SessionError> {
        let destination = effective_target(self.store.tree(), target);
        let result = self.store.move_node(source, target);
        let outcome = self.persist(result)?;

        if let (false, Ok(folder), Some(name)) = (outcome.is_noop(), destination, source.name()) {
            self.follow(source, &folder.join(name));
        }
        Ok(outcome)
    }

    /// Ingest uploaded entries under `parent`.
    pub fn ingest(
        &mut self,
        parent: &NodePath,
        entries: &[UploadEntry],
    ) -> Result<Outcome, SessionError> {
        let result = self.store.ingest(parent, entries);
        self.persist(result)
    }

    /// Write the edit buffer into the selected file.
    pub fn save_buffer(&mut self) -> Result<Outcome, SessionError> {
        let path = self.selection.clone().ok_or(SessionError::NoSelection)?;
        let result = self.store.write_content(&path, &self.buffer);
        let outcome = self.persist(result)?;
        self.dirty = false;
        Ok(outcome)
    }

    fn persist(&mut self, result: Result<Outcome, TreeError>) -> Result<Outcome, SessionError> {
        let outcome = result?;
        if !outcome.is_noop() {
            let version = self.saves.submit(self.store.snapshot());
            debug!(project = %self.project_id, version, "snapshot submitted");
        }
        Ok(outcome)
    }

    fn follow(&mut self, from: &NodePath, to: &NodePath) {
        if let Some(moved) = self.selection.as_ref().and_then(|s| s.rebase(from, to)) {
            self.selection = Some(moved);
        }
        if let Some(moved) = self.current_path.rebase(from, to) {
            self.current_path = moved;
        }
        self.expanded.rebase(from, to);
    }

    // ==================== Drag and drop ====================

    pub fn begin_drag(&mut self, path: impl Into<NodePath>) {
        self.drag.begin(path);
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    pub fn dragged(&self) -> Option<&NodePath> {
        self.drag.dragged()
    }

    /// End the current drag over `target`.
    pub fn drop_on(&mut self, target: &DropTarget) -> Result<Outcome, SessionError> {
        match self.drag.drop_on(target) {
            DropCommand::Move { source, target } => self.move_node(&source, &target),
            DropCommand::Ignored(reason) => {
                debug!(?reason, "drop ignored");
                Ok(Outcome::NoOp)
            }
        }
    }

    // ==================== Selection and buffer ====================

    /// Select a file and load its content into the edit buffer.
    pub fn select(&mut self, path: &NodePath) -> Result<(), SessionError> {
        let content = match self.store.tree().resolve(path)? {
            NodeRef::File(file) => file.content.clone(),
            NodeRef::Folder(_) => return Err(TreeError::not_a_file(path).into()),
        };
        self.selection = Some(path.clone());
        self.buffer = content;
        self.dirty = false;
        Ok(())
    }

    pub fn selection(&self) -> Option<&NodePath> {
        self.selection.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.buffer.clear();
        self.dirty = false;
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Replace the edit buffer. Nothing is written until [`Self::save_buffer`].
    pub fn edit_buffer(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.dirty = true;
    }

    /// Whether the buffer has edits not yet written to the tree.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ==================== Creation cursor and expansion ====================

    /// Folder new items are created in.
    pub fn current_path(&self) -> &NodePath {
        &self.current_path
    }

    pub fn set_current_path(&mut self, path: &NodePath) -> Result<(), SessionError> {
        match self.store.tree().resolve(path)? {
            NodeRef::Folder(_) => {
                self.current_path = path.clone();
                Ok(())
            }
            NodeRef::File(_) => Err(TreeError::invalid_path(path).into()),
        }
    }

    /// Toggle a folder and return whether it is now expanded.
    pub fn toggle_folder(&mut self, path: &NodePath) -> bool {
        self.expanded.toggle(path)
    }

    pub fn collapse_all(&mut self) {
        self.expanded.collapse_all();
    }

    pub fn is_expanded(&self, path: &NodePath) -> bool {
        self.expanded.is_expanded(path)
    }

    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        visible_rows(self.store.tree(), &self.expanded)
    }

    // ==================== Export and persistence ====================

    pub fn archive_options(&self) -> ArchiveOptions {
        ArchiveOptions::from(self.store.config())
    }

    /// Export the current snapshot as zip bytes.
    pub fn export(&self) -> Result<Vec<u8>, SessionError> {
        Ok(export(self.store.tree(), &self.archive_options())?)
    }

    /// Export the current snapshot on the blocking pool.
    ///
    /// The session stays free to mutate while the export runs; the export
    /// sees the snapshot taken at call time.
    pub fn spawn_export(&self) -> JoinHandle<Result<Vec<u8>, SessionError>> {
        let tree = self.store.snapshot();
        let options = self.archive_options();
        tokio::task::spawn_blocking(move || Ok(export(&tree, &options)?))
    }

    pub fn archive_file_name(&self) -> String {
        archive_file_name(&self.project_name)
    }

    /// Save reports received so far, oldest first.
    pub fn drain_reports(&mut self) -> Vec<SaveReport> {
        let mut reports = Vec::new();
        while let Ok(report) = self.reports.try_recv() {
            reports.push(report);
        }
        reports
    }

    /// Wait for the next save report.
    pub async fn next_report(&mut self) -> Option<SaveReport> {
        self.reports.recv().await
    }

    /// Close the session. The last pending save is still written.
    pub async fn close(self) {
        info!(project = %self.project_id, version = self.store.version(), "closing project");
        self.saves.close().await;
    }
}
