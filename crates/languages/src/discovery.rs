//! Discovery of C# sources under a project root

use entity_lengths_core::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directories that never hold hand-written sources
const SKIP_DIRS: &[&str] = &["bin", "obj", "node_modules"];

/// Suffix of files produced by source generators, including this one
const GENERATED_SUFFIX: &str = ".g.cs";

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIP_DIRS.contains(&name.as_ref())
}

/// Whether `path` is a hand-written C# source file
pub fn is_csharp_source(path: &Path) -> bool {
    let is_cs = path.extension().is_some_and(|ext| ext == "cs");
    let generated = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(GENERATED_SUFFIX));
    is_cs && !generated
}

/// Every C# source file under `root`, sorted by path
pub fn discover_sources(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::invalid_input(format!(
            "Source root is not a directory: {}",
            root.display()
        )));
    }
    let mut sources = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry))
    {
        let entry = entry.map_err(|e| Error::with_context("Failed to walk source root", e))?;
        if entry.file_type().is_file() && is_csharp_source(entry.path()) {
            sources.push(entry.into_path());
        }
    }
    sources.sort();
    Ok(sources)
}

/// Assembly name of the project at `root`: the stem of the first `.csproj`
/// file found directly in it, else the directory name
pub fn detect_assembly_name(root: &Path) -> Option<String> {
    let project = WalkDir::new(root)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| {
            entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "csproj")
        });
    if let Some(stem) = project
        .as_ref()
        .and_then(|entry| entry.path().file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
    {
        return Some(stem);
    }
    let canonical = root.canonicalize().ok()?;
    canonical
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}
