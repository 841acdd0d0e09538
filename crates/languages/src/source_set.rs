//! The mutable set of parsed source files behind a project

use crate::discovery::{discover_sources, is_csharp_source};
use crate::resolution::link;
use crate::{parse_file, ParsedFile};
use entity_lengths_core::compilation::Compilation;
use entity_lengths_core::error::Result;
use entity_lengths_core::structural_hash::content_hash;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of refreshing one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// The file was parsed for the first time or its content changed
    Updated,
    /// The content hash matched the previous parse
    Unchanged,
    /// The file is not a C# source or could not be read or parsed
    Skipped,
}

/// Parsed files keyed by path, refreshed incrementally as files change
#[derive(Debug, Default)]
pub struct SourceSet {
    files: HashMap<PathBuf, Arc<ParsedFile>>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// Parses every source under `roots`; returns the number of files updated
    pub fn scan_roots(&mut self, roots: &[PathBuf]) -> Result<usize> {
        let mut updated = 0;
        for root in roots {
            for path in discover_sources(root)? {
                if self.refresh_file(&path) == Refresh::Updated {
                    updated += 1;
                }
            }
        }
        debug!("Scanned {} roots: {updated} files updated", roots.len());
        Ok(updated)
    }

    /// Re-reads `path`, reparsing it only when its content changed
    ///
    /// Unreadable or unparsable files are logged and left out; the rest of
    /// the project keeps generating.
    pub fn refresh_file(&mut self, path: &Path) -> Refresh {
        if !is_csharp_source(path) {
            return Refresh::Skipped;
        }
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                warn!("Could not read {}: {e}", path.display());
                return Refresh::Skipped;
            }
        };
        if let Some(existing) = self.files.get(path) {
            if existing.content_hash == content_hash(&source) {
                return Refresh::Unchanged;
            }
        }
        match parse_file(path, &source) {
            Ok(parsed) => {
                self.files.insert(path.to_path_buf(), Arc::new(parsed));
                Refresh::Updated
            }
            Err(e) => {
                warn!("Could not parse {}: {e}", path.display());
                Refresh::Skipped
            }
        }
    }

    /// Forgets a deleted file; returns whether it was known
    pub fn remove(&mut self, path: &Path) -> bool {
        self.files.remove(path).is_some()
    }

    /// Links the current files into a compilation
    pub fn link(&self, assembly_name: &str) -> Compilation {
        let mut files: Vec<Arc<ParsedFile>> = self.files.values().cloned().collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        link(assembly_name, &files)
    }
}
