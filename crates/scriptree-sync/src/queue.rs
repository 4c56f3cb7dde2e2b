//! Ordered background saves.

use std::sync::Arc;

use scriptree_core::Tree;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::SyncError;
use crate::sync::ExternalSync;

/// Outcome of one save attempt, delivered to the session's failure hook.
#[derive(Debug)]
pub struct SaveReport {
    /// Submission version of the snapshot that was written.
    pub version: u64,
    /// Versions folded into this save without being written themselves.
    pub coalesced: u64,
    pub result: Result<(), SyncError>,
}

impl SaveReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

struct Pending {
    version: u64,
    tree: Tree,
}

/// Background writer for one project.
///
/// [`SaveQueue::submit`] never blocks. A single worker task takes snapshots
/// in submission order and awaits each save before starting the next, so an
/// older snapshot can never overwrite a newer one. With coalescing enabled,
/// snapshots that piled up behind an in-flight save collapse into the newest.
pub struct SaveQueue {
    project_id: String,
    tx: mpsc::UnboundedSender<Pending>,
    version: u64,
    closing: CancellationToken,
    worker: JoinHandle<()>,
}

impl SaveQueue {
    /// Start the worker on the current tokio runtime.
    ///
    /// Returns the queue and the receiving end of its report channel.
    pub fn spawn<S>(
        store: Arc<S>,
        project_id: impl Into<String>,
        coalesce: bool,
    ) -> (Self, mpsc::UnboundedReceiver<SaveReport>)
    where
        S: ExternalSync + ?Sized + 'static,
    {
        let project_id = project_id.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let closing = CancellationToken::new();

        let worker = tokio::spawn(run_worker(
            store,
            project_id.clone(),
            rx,
            report_tx,
            closing.clone(),
            coalesce,
        ));

        let queue = Self {
            project_id,
            tx,
            version: 0,
            closing,
            worker,
        };
        (queue, report_rx)
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Version stamped on the most recent submission (0 before any).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Queue a snapshot for saving and return its version.
    pub fn submit(&mut self, tree: Tree) -> u64 {
        self.version += 1;
        let version = self.version;
        if self.tx.send(Pending { version, tree }).is_err() {
            warn!(project = %self.project_id, version, "save worker has stopped, snapshot dropped");
        } else {
            trace!(project = %self.project_id, version, "save queued");
        }
        version
    }

    /// Stop accepting snapshots and wait for the worker to drain.
    ///
    /// The in-flight save completes and the newest pending snapshot is still
    /// written, but no further reports are delivered.
    pub async fn close(self) {
        self.closing.cancel();
        drop(self.tx);
        if let Err(err) = self.worker.await {
            warn!(project = %self.project_id, "save worker ended abnormally: {err}");
        }
        debug!(project = %self.project_id, version = self.version, "save queue closed");
    }
}

async fn run_worker<S>(
    store: Arc<S>,
    project_id: String,
    mut rx: mpsc::UnboundedReceiver<Pending>,
    reports: mpsc::UnboundedSender<SaveReport>,
    closing: CancellationToken,
    coalesce: bool,
) where
    S: ExternalSync + ?Sized,
{
    while let Some(mut next) = rx.recv().await {
        let mut coalesced = 0;
        if coalesce || closing.is_cancelled() {
            while let Ok(newer) = rx.try_recv() {
                next = newer;
                coalesced += 1;
            }
        }

        let result = store.save(&project_id, &next.tree).await;
        match &result {
            Ok(()) => debug!(
                project = %project_id,
                store = store.name(),
                version = next.version,
                coalesced,
                "snapshot saved"
            ),
            Err(err) => warn!(
                project = %project_id,
                store = store.name(),
                version = next.version,
                "save failed: {err}"
            ),
        }

        if closing.is_cancelled() {
            continue;
        }
        let report = SaveReport {
            version: next.version,
            coalesced,
            result,
        };
        if reports.send(report).is_err() {
            trace!(project = %project_id, "nobody is listening for save reports");
        }
    }
}
