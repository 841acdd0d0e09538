#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

//! File system watching for incremental regeneration
//!
//! This crate reports debounced changes to C# source files:
//! - Per-path debouncing that folds bursts of editor writes into one change
//! - Extension allow list and glob ignore patterns
//! - Recursive watching through the platform's native backend
//!
//! # Example
//!
//! ```no_run
//! use entity_lengths_watcher::{FileWatcher, WatcherConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut watcher = FileWatcher::new(WatcherConfig::default())?;
//! let mut events = watcher.watch("/path/to/project")?;
//!
//! while let Some(change) = events.recv().await {
//!     println!("Source changed: {:?}", change);
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod debouncer;
mod events;
mod ignore;
mod watcher;

pub use config::{WatcherConfig, WatcherConfigBuilder};
pub use debouncer::EventDebouncer;
pub use events::FileChange;
pub use ignore::{IgnoreFilter, IgnoreFilterBuilder};
pub use watcher::FileWatcher;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::WatcherConfig;
    pub use crate::events::FileChange;
    pub use crate::watcher::FileWatcher;
}
