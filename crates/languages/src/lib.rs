//! C# front end for the entity-lengths generator
//!
//! Parses C# sources with tree-sitter, lowers them into the arena syntax
//! model of `entity-lengths-core`, resolves type references and links the
//! files of a project into a [`Compilation`](entity_lengths_core::Compilation).

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use entity_lengths_core::error::{Error, Result};
use entity_lengths_core::structural_hash::content_hash;
use entity_lengths_core::syntax::SyntaxTree;
use std::path::{Path, PathBuf};

mod common;
mod csharp;
mod discovery;
mod resolution;
mod source_set;

pub use csharp::CSharpParser;
pub use discovery::{detect_assembly_name, discover_sources, is_csharp_source};
pub use resolution::{link, TypeIndex};
pub use source_set::{Refresh, SourceSet};

/// Trait for turning source text into a syntax tree
pub trait SourceParser: Send {
    /// Parse one file; syntax errors are recovered where possible
    fn parse(&mut self, source: &str, file_path: &Path) -> Result<SyntaxTree>;
}

/// Language descriptor for parser lookup by file extension
pub struct LanguageDescriptor {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    pub factory: fn() -> Result<Box<dyn SourceParser>>,
}

fn csharp_factory() -> Result<Box<dyn SourceParser>> {
    Ok(Box::new(CSharpParser::new()?))
}

const LANGUAGES: &[LanguageDescriptor] = &[LanguageDescriptor {
    name: "csharp",
    extensions: &["cs"],
    factory: csharp_factory,
}];

fn descriptor_for(file_path: &Path) -> Option<&'static LanguageDescriptor> {
    let extension = file_path.extension()?.to_str()?.to_lowercase();
    LANGUAGES
        .iter()
        .find(|descriptor| descriptor.extensions.contains(&extension.as_str()))
}

/// Create an appropriate parser for a file based on its extension
///
/// Returns Ok(None) if the file type is not supported, Err if parser creation fails
pub fn create_parser(file_path: &Path) -> Result<Option<Box<dyn SourceParser>>> {
    match descriptor_for(file_path) {
        Some(descriptor) => Ok(Some((descriptor.factory)()?)),
        None => Ok(None),
    }
}

/// Get the language identifier from a file path
pub fn detect_language(file_path: &Path) -> Option<&'static str> {
    descriptor_for(file_path).map(|descriptor| descriptor.name)
}

/// A parsed, not yet resolved, source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    pub path: PathBuf,
    /// Hash of the text the tree was parsed from
    pub content_hash: u128,
    pub tree: SyntaxTree,
}

/// Parses `source` with the parser registered for the extension of `file_path`
pub fn parse_file(file_path: &Path, source: &str) -> Result<ParsedFile> {
    let mut parser = create_parser(file_path)?.ok_or_else(|| {
        Error::invalid_input(format!("Unsupported source file: {}", file_path.display()))
    })?;
    let tree = parser.parse(source, file_path)?;
    Ok(ParsedFile {
        path: file_path.to_path_buf(),
        content_hash: content_hash(source),
        tree,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detect_language_by_extension() {
        assert_eq!(detect_language(Path::new("Models/User.cs")), Some("csharp"));
        assert_eq!(detect_language(Path::new("Models/User.CS")), Some("csharp"));
        assert_eq!(detect_language(Path::new("README.md")), None);
        assert_eq!(detect_language(Path::new("Makefile")), None);
    }

    #[test]
    fn test_parse_file_rejects_unsupported_extension() {
        assert!(parse_file(Path::new("schema.sql"), "select 1").is_err());
    }

    #[test]
    fn test_parse_file_records_content_hash() {
        let source = "public class User { }";
        let parsed = parse_file(Path::new("User.cs"), source).unwrap();
        assert_eq!(parsed.content_hash, content_hash(source));
        assert_eq!(parsed.tree.classes().count(), 1);
    }
}
