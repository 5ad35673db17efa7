//! Repository-backed progress sink.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::ports::{DocumentRepository, ProgressSink};

type Update = (String, usize);

/// Persists playback progress through a [`DocumentRepository`].
///
/// Updates go to a single writer task, so writes for a document land in
/// the order they were recorded. Updates that queue up while a write is in
/// flight are collapsed to the newest one per document. Failures are
/// logged and otherwise ignored.
pub struct RepositoryProgressSink {
    updates: mpsc::UnboundedSender<Update>,
}

impl RepositoryProgressSink {
    /// Start the writer task on `runtime`. It runs until the sink is dropped.
    pub fn new(repo: Arc<dyn DocumentRepository>, runtime: Handle) -> Self {
        let (updates, rx) = mpsc::unbounded_channel();
        runtime.spawn(write_progress(repo, rx));
        Self { updates }
    }
}

impl ProgressSink for RepositoryProgressSink {
    fn record(&self, document_id: &str, segment_id: usize) {
        if self
            .updates
            .send((document_id.to_string(), segment_id))
            .is_err()
        {
            tracing::warn!(document_id, segment_id, "Progress writer is gone, update dropped");
        }
    }
}

async fn write_progress(repo: Arc<dyn DocumentRepository>, mut rx: mpsc::UnboundedReceiver<Update>) {
    while let Some(first) = rx.recv().await {
        let mut pending = vec![first];
        while let Ok((document_id, segment_id)) = rx.try_recv() {
            match pending.iter_mut().find(|(id, _)| *id == document_id) {
                Some(entry) => entry.1 = segment_id,
                None => pending.push((document_id, segment_id)),
            }
        }

        for (document_id, segment_id) in pending {
            if let Err(e) = repo.update_progress(&document_id, segment_id).await {
                tracing::warn!(
                    document_id = %document_id,
                    segment_id,
                    error = %e,
                    "Failed to persist reading progress"
                );
            }
        }
    }

    tracing::debug!("Progress writer stopped");
}
