//! A generation session over one C# project
//!
//! The session owns the parsed sources and the incremental generator, so
//! watch mode can apply file changes and regenerate without reparsing the
//! whole project.

use anyhow::{anyhow, Context, Result};
use entity_lengths_core::config::{Config, GeneratorOptions};
use entity_lengths_core::entities::{EntityFacts, Stream};
use entity_lengths_generator::{GenerationOutcome, GenerationStats, IncrementalGenerator};
use entity_lengths_languages::{detect_assembly_name, Refresh, SourceSet};
use entity_lengths_watcher::FileChange;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Inputs of a session, resolved from configuration and command-line flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub roots: Vec<PathBuf>,
    /// Explicit output path; the generated hint name under the first root otherwise
    pub output: Option<PathBuf>,
    pub assembly_name: String,
    pub defaults: GeneratorOptions,
}

impl SessionSettings {
    /// Resolves settings from `config`, with non-empty `roots` and an explicit
    /// assembly name taking precedence
    pub fn from_config(
        config: &Config,
        roots: Vec<PathBuf>,
        output: Option<PathBuf>,
        assembly_name: Option<String>,
    ) -> Result<Self> {
        let roots = if roots.is_empty() {
            config.project.roots.clone()
        } else {
            roots
        };
        let first_root = roots
            .first()
            .ok_or_else(|| anyhow!("No source roots configured"))?;
        let assembly_name = assembly_name
            .or_else(|| config.project.assembly_name.clone())
            .or_else(|| detect_assembly_name(first_root))
            .unwrap_or_default();
        debug!("Assembly name resolved to {assembly_name:?}");

        Ok(Self {
            output: output.or_else(|| config.project.output.clone()),
            roots,
            assembly_name,
            defaults: config.generator.clone(),
        })
    }
}

/// Parsed project state plus the generator that reuses results across runs
#[derive(Debug)]
pub struct GenerationSession {
    settings: SessionSettings,
    sources: SourceSet,
    generator: IncrementalGenerator,
}

impl GenerationSession {
    pub fn new(settings: SessionSettings) -> Self {
        let generator = IncrementalGenerator::new(settings.defaults.clone());
        Self {
            settings,
            sources: SourceSet::new(),
            generator,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Number of source files currently parsed
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Parses every source under the configured roots
    pub fn scan(&mut self) -> Result<usize> {
        let updated = self
            .sources
            .scan_roots(&self.settings.roots)
            .context("Failed to scan source roots")?;
        info!(
            "Parsed {updated} source file(s) under {} root(s)",
            self.settings.roots.len()
        );
        Ok(updated)
    }

    /// Applies one debounced file change; returns whether the sources changed
    pub fn apply(&mut self, change: &FileChange) -> bool {
        let path = change.path();
        if !self.is_under_roots(path) {
            debug!("Ignoring change outside the source roots: {}", path.display());
            return false;
        }
        if change.is_removal() {
            let removed = self.sources.remove(path);
            if removed {
                debug!("Removed {}", path.display());
            }
            return removed;
        }
        match self.sources.refresh_file(path) {
            Refresh::Updated => {
                debug!("Reparsed {}", path.display());
                true
            }
            Refresh::Unchanged => false,
            // A file that became unreadable no longer contributes
            Refresh::Skipped => self.sources.remove(path),
        }
    }

    /// Links the current sources and runs the generator
    pub fn regenerate(&mut self) -> GenerationOutcome {
        let compilation = self.sources.link(&self.settings.assembly_name);
        let outcome = self.generator.run(&compilation);
        debug!(
            "{} cached, {} extracted, {} stale across {} source file(s)",
            outcome.stats.cache_hits,
            outcome.stats.cache_misses,
            outcome.stats.stale_entries_dropped,
            self.sources.len()
        );
        outcome
    }

    /// Path the generated unit of `outcome` is written to
    pub fn output_path(&self, outcome: &GenerationOutcome) -> PathBuf {
        match &self.settings.output {
            Some(output) => output.clone(),
            None => self
                .settings
                .roots
                .first()
                .map(|root| root.join(&outcome.source.hint_name))
                .unwrap_or_else(|| PathBuf::from(&outcome.source.hint_name)),
        }
    }

    /// Writes the generated unit unless the file already holds the same text
    ///
    /// Returns whether the file was written.
    pub fn write_output(&self, outcome: &GenerationOutcome) -> Result<bool> {
        let path = self.output_path(outcome);
        if !outcome.changed && path.exists() {
            return Ok(false);
        }
        if let Ok(existing) = std::fs::read_to_string(&path) {
            if existing == outcome.source.text {
                debug!("{} is up to date", path.display());
                return Ok(false);
            }
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, &outcome.source.text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {}", path.display());
        Ok(true)
    }

    fn is_under_roots(&self, path: &Path) -> bool {
        let inside = self.settings.roots.iter().any(|root| path.starts_with(root));
        if !inside && path.is_relative() {
            warn!("Relative change path {} cannot be matched", path.display());
        }
        inside
    }
}

/// JSON document printed by the `facts` command
#[derive(Debug, Clone, Serialize)]
pub struct FactsReport {
    pub assembly_name: String,
    pub generated_class_name: String,
    pub streams: BTreeMap<Stream, Vec<EntityFacts>>,
    pub stats: GenerationStats,
}

impl FactsReport {
    pub fn new(assembly_name: &str, outcome: GenerationOutcome) -> Self {
        Self {
            assembly_name: assembly_name.to_string(),
            generated_class_name: outcome.options.generated_class_name,
            streams: outcome.facts,
            stats: outcome.stats,
        }
    }
}
