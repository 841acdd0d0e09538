//! Path filtering for watched files
//!
//! A path is reported only when its extension is in the allow list and no
//! ignore glob matches it.

use glob::{MatchOptions, Pattern, PatternError};
use std::collections::HashSet;
use std::path::Path;
use tracing::trace;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Decides which paths the watcher reports
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    /// Glob patterns to ignore
    patterns: Vec<Pattern>,
    /// Lowercase extensions to report; empty reports every extension
    extensions: HashSet<String>,
}

impl IgnoreFilter {
    /// Create with builder pattern
    pub fn builder() -> IgnoreFilterBuilder {
        IgnoreFilterBuilder::default()
    }

    /// Check if a path should be ignored
    pub fn should_ignore(&self, path: &Path) -> bool {
        if !self.extensions.is_empty() {
            let extension = path
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase());
            if !extension.is_some_and(|ext| self.extensions.contains(&ext)) {
                trace!("Ignoring {:?}: extension not watched", path);
                return true;
            }
        }

        let matched = self
            .patterns
            .iter()
            .any(|pattern| pattern.matches_path_with(path, MATCH_OPTIONS));
        if matched {
            trace!("Ignoring {:?}: matches ignore pattern", path);
        }
        matched
    }
}

/// Builder for IgnoreFilter
#[derive(Debug, Default)]
pub struct IgnoreFilterBuilder {
    patterns: Vec<String>,
    extensions: Vec<String>,
}

impl IgnoreFilterBuilder {
    /// Add a glob pattern to ignore
    pub fn add_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Add multiple patterns
    pub fn patterns(mut self, patterns: impl IntoIterator<Item = String>) -> Self {
        self.patterns.extend(patterns);
        self
    }

    /// Set reported file extensions (a leading dot is accepted)
    pub fn extensions(mut self, extensions: impl IntoIterator<Item = String>) -> Self {
        self.extensions.extend(extensions);
        self
    }

    /// Build the ignore filter
    pub fn build(self) -> Result<IgnoreFilter, PatternError> {
        let patterns = self
            .patterns
            .iter()
            .map(|pattern| Pattern::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        let extensions = self
            .extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect();
        Ok(IgnoreFilter {
            patterns,
            extensions,
        })
    }
}
