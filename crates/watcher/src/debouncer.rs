//! Per-path debouncing of file system events
//!
//! The first event for a path starts a timer; events arriving for the same
//! path before it fires are folded into the pending one. When the window
//! closes the aggregated change is emitted.

use crate::events::{DebouncedEvent, FileChange};
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, trace};

/// Manages debouncing of file system events
pub struct EventDebouncer {
    /// Debounce window duration
    debounce_duration: Duration,
    /// Map of paths to pending events
    pending_events: Arc<DashMap<PathBuf, DebouncedEvent>>,
    /// Channel to send debounced events
    output_tx: mpsc::Sender<FileChange>,
}

impl EventDebouncer {
    pub fn new(debounce_duration: Duration, output_tx: mpsc::Sender<FileChange>) -> Self {
        Self {
            debounce_duration,
            pending_events: Arc::new(DashMap::new()),
            output_tx,
        }
    }

    /// Process an incoming event
    pub fn process_event(&self, event: FileChange) {
        let path = event.path().to_path_buf();

        self.pending_events
            .entry(path.clone())
            .and_modify(|pending| {
                trace!("Folding event into pending change for {:?}", path);
                pending.update(event.clone());
            })
            .or_insert_with(|| {
                let pending_events = Arc::clone(&self.pending_events);
                let output_tx = self.output_tx.clone();
                let debounce_duration = self.debounce_duration;
                let key = path.clone();

                tokio::spawn(async move {
                    sleep(debounce_duration).await;
                    if let Some((_, pending)) = pending_events.remove(&key) {
                        debug!(
                            "Emitting {:?} (aggregated {} event(s) over {:?})",
                            pending.event,
                            pending.occurrence_count,
                            pending.first_seen.elapsed().unwrap_or_default()
                        );
                        let _ = output_tx.send(pending.event).await;
                    }
                });

                DebouncedEvent::new(event.clone())
            });
    }

    /// Emit every pending event immediately
    pub async fn flush(&self) {
        let paths: Vec<PathBuf> = self
            .pending_events
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        debug!("Flushing {} pending event(s)", paths.len());

        for path in paths {
            if let Some((_, pending)) = self.pending_events.remove(&path) {
                let _ = self.output_tx.send(pending.event).await;
            }
        }
    }

    /// Get the number of pending events
    pub fn pending_count(&self) -> usize {
        self.pending_events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::time::timeout;

    fn cs(name: &str) -> PathBuf {
        PathBuf::from(format!("src/{name}.cs"))
    }

    #[tokio::test]
    async fn test_events_within_window_are_aggregated() {
        let (tx, mut rx) = mpsc::channel(16);
        let debouncer = EventDebouncer::new(Duration::from_millis(50), tx);

        debouncer.process_event(FileChange::Created(cs("User")));
        debouncer.process_event(FileChange::Modified(cs("User")));
        debouncer.process_event(FileChange::Modified(cs("User")));
        assert_eq!(debouncer.pending_count(), 1);

        let event = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for debounced event");
        assert_eq!(event, Some(FileChange::Created(cs("User"))));
        assert_eq!(debouncer.pending_count(), 0);

        let extra = timeout(Duration::from_millis(150), rx.recv()).await;
        assert!(extra.is_err(), "only one event expected");
    }

    #[tokio::test]
    async fn test_distinct_paths_emit_separately() {
        let (tx, mut rx) = mpsc::channel(16);
        let debouncer = EventDebouncer::new(Duration::from_millis(20), tx);

        debouncer.process_event(FileChange::Modified(cs("User")));
        debouncer.process_event(FileChange::Deleted(cs("Blog")));

        let mut received = Vec::new();
        for _ in 0..2 {
            let event = timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("timed out waiting for debounced event")
                .expect("channel closed");
            received.push(event);
        }
        received.sort_by(|a, b| a.path().cmp(b.path()));
        assert_eq!(
            received,
            vec![
                FileChange::Deleted(cs("Blog")),
                FileChange::Modified(cs("User")),
            ]
        );
    }

    #[tokio::test]
    async fn test_flush_emits_pending_events() {
        let (tx, mut rx) = mpsc::channel(16);
        let debouncer = EventDebouncer::new(Duration::from_secs(60), tx);

        debouncer.process_event(FileChange::Modified(cs("User")));
        debouncer.flush().await;

        assert_eq!(rx.recv().await, Some(FileChange::Modified(cs("User"))));
        assert_eq!(debouncer.pending_count(), 0);
    }
}
