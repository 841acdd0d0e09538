//! File change event types

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A debounced file system change
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileChange {
    /// File was created
    Created(PathBuf),
    /// File was modified
    Modified(PathBuf),
    /// File was deleted
    Deleted(PathBuf),
}

impl FileChange {
    /// Get the path associated with this change
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(path) | Self::Modified(path) | Self::Deleted(path) => path,
        }
    }

    /// Whether the file no longer exists after this change
    pub fn is_removal(&self) -> bool {
        matches!(self, Self::Deleted(_))
    }

    /// The change equivalent to `self` followed by `next` on the same path
    ///
    /// A creation stays a creation when the new file is written to; a file
    /// deleted and created again within one window counts as modified.
    pub fn followed_by(&self, next: FileChange) -> FileChange {
        match (self, next) {
            (Self::Created(path), Self::Modified(_)) => Self::Created(path.clone()),
            (Self::Deleted(path), Self::Created(_)) => Self::Modified(path.clone()),
            (_, next) => next,
        }
    }
}

/// Event with debounce metadata
#[derive(Debug, Clone)]
pub(crate) struct DebouncedEvent {
    /// The aggregated file change
    pub event: FileChange,
    /// When the event was first detected
    pub first_seen: SystemTime,
    /// Number of raw events folded into this one
    pub occurrence_count: u32,
}

impl DebouncedEvent {
    pub fn new(event: FileChange) -> Self {
        Self {
            event,
            first_seen: SystemTime::now(),
            occurrence_count: 1,
        }
    }

    /// Fold a later occurrence into this event
    pub fn update(&mut self, event: FileChange) {
        self.event = self.event.followed_by(event);
        self.occurrence_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn path() -> PathBuf {
        PathBuf::from("src/User.cs")
    }

    #[test]
    fn test_created_then_modified_stays_created() {
        let merged = FileChange::Created(path()).followed_by(FileChange::Modified(path()));
        assert_eq!(merged, FileChange::Created(path()));
    }

    #[test]
    fn test_deleted_then_created_is_modified() {
        let merged = FileChange::Deleted(path()).followed_by(FileChange::Created(path()));
        assert_eq!(merged, FileChange::Modified(path()));
    }

    #[test]
    fn test_later_deletion_wins() {
        let merged = FileChange::Created(path()).followed_by(FileChange::Deleted(path()));
        assert_eq!(merged, FileChange::Deleted(path()));
        assert!(merged.is_removal());
    }

    #[test]
    fn test_debounced_event_counts_occurrences() {
        let mut event = DebouncedEvent::new(FileChange::Created(path()));
        event.update(FileChange::Modified(path()));
        event.update(FileChange::Modified(path()));
        assert_eq!(event.occurrence_count, 3);
        assert_eq!(event.event, FileChange::Created(path()));
        assert!(event.first_seen <= SystemTime::now());
    }
}
