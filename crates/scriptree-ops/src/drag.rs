//! Drag-and-drop reparenting.
//!
//! A drop is reduced to a pure `(source, target)` command before it reaches
//! the store. Only the dragged path survives between the start and the end of
//! a gesture.

use scriptree_core::{NodePath, TreeError};
use tracing::{debug, trace};

use crate::operation::{Outcome, TreeOperation};
use crate::store::TreeStore;

/// Where a dragged node was released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Released over a node row.
    Node(NodePath),
    /// Released over empty space.
    Canvas,
}

/// Why a drop produced no command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredDrop {
    /// Dropped onto itself.
    SelfDrop,
    /// Dropped onto empty space.
    Canvas,
    /// No gesture was in progress.
    NoGesture,
}

/// Result of interpreting a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropCommand {
    /// Move `source` under `target`. A file target is resolved to its parent
    /// folder by the move itself.
    Move { source: NodePath, target: NodePath },
    /// Swallowed without touching the store.
    Ignored(IgnoredDrop),
}

impl DropCommand {
    /// Operation to apply, if any.
    pub fn into_operation(self) -> Option<TreeOperation> {
        match self {
            Self::Move { source, target } => Some(TreeOperation::Move { source, target }),
            Self::Ignored(_) => None,
        }
    }
}

/// Interpret dropping `source` on `target`.
pub fn drop_command(source: &NodePath, target: &DropTarget) -> DropCommand {
    match target {
        DropTarget::Canvas => DropCommand::Ignored(IgnoredDrop::Canvas),
        DropTarget::Node(target) if target == source => DropCommand::Ignored(IgnoredDrop::SelfDrop),
        DropTarget::Node(target) => DropCommand::Move {
            source: source.clone(),
            target: target.clone(),
        },
    }
}

/// Tracks the node being dragged for the length of one gesture.
#[derive(Debug, Clone, Default)]
pub struct DragReparentController {
    dragged: Option<NodePath>,
}

impl DragReparentController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start dragging `path`, replacing any abandoned gesture.
    pub fn begin(&mut self, path: impl Into<NodePath>) {
        let path = path.into();
        trace!(path = %path, "drag started");
        self.dragged = Some(path);
    }

    /// Abandon the current gesture.
    pub fn cancel(&mut self) {
        self.dragged = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    pub fn dragged(&self) -> Option<&NodePath> {
        self.dragged.as_ref()
    }

    /// End the gesture over `target` and interpret it.
    pub fn drop_on(&mut self, target: &DropTarget) -> DropCommand {
        match self.dragged.take() {
            Some(source) => drop_command(&source, target),
            None => DropCommand::Ignored(IgnoredDrop::NoGesture),
        }
    }

    /// End the gesture over `target` and apply the resulting move to `store`.
    ///
    /// Ignored drops never reach the store and report `NoOp`.
    pub fn drop_into(
        &mut self,
        store: &mut TreeStore,
        target: &DropTarget,
    ) -> Result<Outcome, TreeError> {
        match self.drop_on(target) {
            DropCommand::Move { source, target } => store.move_node(&source, &target),
            DropCommand::Ignored(reason) => {
                debug!(?reason, "drop ignored");
                Ok(Outcome::NoOp)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> NodePath {
        NodePath::parse(s)
    }

    #[test]
    fn test_drop_on_self_is_ignored() {
        let cmd = drop_command(&path("server"), &DropTarget::Node(path("/server/")));
        assert_eq!(cmd, DropCommand::Ignored(IgnoredDrop::SelfDrop));
    }

    #[test]
    fn test_drop_on_canvas_is_ignored() {
        let cmd = drop_command(&path("a.lua"), &DropTarget::Canvas);
        assert_eq!(cmd.into_operation(), None);
    }

    #[test]
    fn test_drop_on_node_moves() {
        let cmd = drop_command(&path("a.lua"), &DropTarget::Node(path("server")));
        assert_eq!(
            cmd.into_operation(),
            Some(TreeOperation::move_to("a.lua", "server"))
        );
    }

    #[test]
    fn test_controller_is_stateless_between_gestures() {
        let mut drag = DragReparentController::new();
        assert_eq!(
            drag.drop_on(&DropTarget::Canvas),
            DropCommand::Ignored(IgnoredDrop::NoGesture)
        );

        drag.begin("a.lua");
        assert!(drag.is_dragging());
        assert_eq!(drag.dragged(), Some(&path("a.lua")));

        drag.drop_on(&DropTarget::Node(path("server")));
        assert!(!drag.is_dragging());

        drag.begin("b.lua");
        drag.cancel();
        assert_eq!(drag.dragged(), None);
    }

    #[test]
    fn test_drop_into_store_falls_back_to_parent_of_file() {
        let mut store = TreeStore::default();
        assert!(!store.create_folder(&NodePath::root(), "server").unwrap().is_noop());
        assert!(!store.create_file(&path("server"), "main.lua").unwrap().is_noop());
        assert!(!store.create_file(&NodePath::root(), "util.lua").unwrap().is_noop());

        let mut drag = DragReparentController::new();
        drag.begin("util.lua");
        let outcome = drag
            .drop_into(&mut store, &DropTarget::Node(path("server/main.lua")))
            .unwrap();
        assert!(!outcome.is_noop());
        assert!(store.tree().resolve(&path("server/util.lua")).is_ok());

        let version = store.version();
        drag.begin("server");
        assert!(drag.drop_into(&mut store, &DropTarget::Node(path("server"))).unwrap().is_noop());
        assert_eq!(store.version(), version);
    }
}
