//! File system watcher built on the notify crate
//!
//! Raw notify events are filtered, converted to [`FileChange`]s and passed
//! through the [`EventDebouncer`] before they reach the caller's channel.

use crate::{
    config::WatcherConfig, debouncer::EventDebouncer, events::FileChange, ignore::IgnoreFilter,
};
use entity_lengths_core::error::{Error, Result};
use notify::event::ModifyKind;
use notify::{
    Config as NotifyConfig, Event as NotifyEvent, EventKind, RecommendedWatcher, RecursiveMode,
    Watcher as NotifyWatcher,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace};

/// Main file system watcher
pub struct FileWatcher {
    config: Arc<WatcherConfig>,
    ignore_filter: Arc<IgnoreFilter>,
    /// Active notify watchers, one per watched root
    watchers: Vec<RecommendedWatcher>,
    watched_paths: Vec<PathBuf>,
}

impl FileWatcher {
    /// Create a new file watcher
    pub fn new(config: WatcherConfig) -> Result<Self> {
        let ignore_filter = IgnoreFilter::builder()
            .patterns(config.ignore_patterns.clone())
            .extensions(config.extensions.clone())
            .build()
            .map_err(|e| Error::watcher(format!("Failed to create ignore filter: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            ignore_filter: Arc::new(ignore_filter),
            watchers: Vec::new(),
            watched_paths: Vec::new(),
        })
    }

    /// Start watching `path` recursively
    ///
    /// Must be called within a tokio runtime. The returned channel yields
    /// debounced changes until the watcher is stopped or dropped.
    pub fn watch(&mut self, path: impl AsRef<Path>) -> Result<mpsc::Receiver<FileChange>> {
        let path = path.as_ref().to_path_buf();
        if !path.is_dir() {
            return Err(Error::watcher(format!(
                "Cannot watch {}: not a directory",
                path.display()
            )));
        }

        let (notify_tx, notify_rx) = mpsc::channel(self.config.max_queue_size);
        let (debounced_tx, debounced_rx) = mpsc::channel(self.config.max_queue_size);

        let debouncer = EventDebouncer::new(self.config.debounce_duration(), debounced_tx);
        self.start_event_processor(notify_rx, debouncer);

        let mut watcher = Self::create_notify_watcher(notify_tx)?;
        watcher
            .watch(&path, RecursiveMode::Recursive)
            .map_err(|e| Error::watcher(format!("Failed to watch path {path:?}: {e}")))?;
        info!("Watching path: {:?}", path);

        self.watchers.push(watcher);
        self.watched_paths.push(path);
        Ok(debounced_rx)
    }

    fn create_notify_watcher(tx: mpsc::Sender<NotifyEvent>) -> Result<RecommendedWatcher> {
        RecommendedWatcher::new(
            move |res: std::result::Result<NotifyEvent, notify::Error>| match res {
                Ok(event) => {
                    if let Err(e) = tx.try_send(event) {
                        error!("Failed to send notify event: {}", e);
                    }
                }
                Err(e) => {
                    error!("Notify error: {}", e);
                }
            },
            NotifyConfig::default(),
        )
        .map_err(|e| Error::watcher(format!("Failed to create watcher: {e}")))
    }

    fn start_event_processor(
        &self,
        mut notify_rx: mpsc::Receiver<NotifyEvent>,
        debouncer: EventDebouncer,
    ) {
        let ignore_filter = Arc::clone(&self.ignore_filter);

        tokio::spawn(async move {
            while let Some(event) = notify_rx.recv().await {
                trace!("Received notify event: {:?}", event);
                for change in convert_notify_event(&event, &ignore_filter) {
                    debouncer.process_event(change);
                }
            }
            debouncer.flush().await;
            debug!("Event processor stopped");
        });
    }

    /// Stop watching all paths
    ///
    /// Pending changes are still delivered before the channels close.
    pub fn stop(&mut self) {
        if !self.watchers.is_empty() {
            self.watchers.clear();
            self.watched_paths.clear();
            info!("File watcher stopped");
        }
    }

    /// Get currently watched paths
    pub fn watched_paths(&self) -> &[PathBuf] {
        &self.watched_paths
    }

    /// Check if a path is being watched
    pub fn is_watching(&self, path: &Path) -> bool {
        self.watched_paths.iter().any(|root| path.starts_with(root))
    }
}

/// Converts one notify event into changes for every reported path
///
/// Renames arrive as name modifications; whether the path still exists
/// decides between creation and deletion.
fn convert_notify_event(event: &NotifyEvent, ignore_filter: &IgnoreFilter) -> Vec<FileChange> {
    event
        .paths
        .iter()
        .filter(|path| !ignore_filter.should_ignore(path))
        .filter_map(|path| {
            let path = path.clone();
            match &event.kind {
                EventKind::Create(_) if path.is_file() => Some(FileChange::Created(path)),
                EventKind::Modify(ModifyKind::Name(_)) => {
                    if path.is_file() {
                        Some(FileChange::Created(path))
                    } else {
                        Some(FileChange::Deleted(path))
                    }
                }
                EventKind::Modify(_) if path.is_file() => Some(FileChange::Modified(path)),
                EventKind::Remove(_) => Some(FileChange::Deleted(path)),
                _ => None,
            }
        })
        .collect()
}
