//! Runtime configuration of the file watcher

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one [`FileWatcher`](crate::FileWatcher)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Debounce window in milliseconds (default: 300ms)
    pub debounce_ms: u64,
    /// Glob patterns of paths never reported
    pub ignore_patterns: Vec<String>,
    /// File extensions that are reported, without the dot (default: `cs`)
    pub extensions: Vec<String>,
    /// Capacity of the internal event channels (default: 10000)
    pub max_queue_size: usize,
}

impl WatcherConfig {
    pub fn builder() -> WatcherConfigBuilder {
        WatcherConfigBuilder::default()
    }

    /// Get the debounce duration
    pub fn debounce_duration(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Editor scratch files and build output that never hold project sources
    pub fn default_ignore_patterns() -> Vec<String> {
        vec![
            "*.tmp".to_string(),
            "*.tmp.*".to_string(),
            "*~".to_string(),
            "*.swp".to_string(),
            "*.bak".to_string(),
            "**/bin/**".to_string(),
            "**/obj/**".to_string(),
            "**/.git/**".to_string(),
            "**/.vs/**".to_string(),
            "**/*.g.cs".to_string(),
        ]
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            ignore_patterns: Self::default_ignore_patterns(),
            extensions: vec!["cs".to_string()],
            max_queue_size: 10_000,
        }
    }
}

impl From<&entity_lengths_core::config::WatcherConfig> for WatcherConfig {
    fn from(settings: &entity_lengths_core::config::WatcherConfig) -> Self {
        Self {
            debounce_ms: settings.debounce_ms,
            ignore_patterns: settings.ignore_patterns.clone(),
            ..Self::default()
        }
    }
}

/// Builder for WatcherConfig
#[derive(Debug, Default)]
pub struct WatcherConfigBuilder {
    config: WatcherConfig,
}

impl WatcherConfigBuilder {
    /// Set debounce window in milliseconds
    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.debounce_ms = ms;
        self
    }

    /// Set ignore patterns
    pub fn ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.ignore_patterns = patterns;
        self
    }

    /// Add an ignore pattern
    pub fn add_ignore_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.ignore_patterns.push(pattern.into());
        self
    }

    /// Set the reported file extensions
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.extensions = extensions;
        self
    }

    /// Set maximum queue size
    pub fn max_queue_size(mut self, size: usize) -> Self {
        self.config.max_queue_size = size;
        self
    }

    /// Build the configuration
    pub fn build(self) -> WatcherConfig {
        self.config
    }
}
