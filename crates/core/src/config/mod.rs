//! Configuration module for entity-lengths
//!
//! This module provides the generator options threaded through every run and
//! the project settings used by the command-line tool. Configuration can be
//! loaded from TOML files and/or environment variables; generator options can
//! additionally be overridden per assembly by the `EntityLengthsGenerator`
//! attribute.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use defaults::*;

pub use defaults::{DEFAULT_GENERATED_CLASS_NAME, DEFAULT_LENGTH_SUFFIX};

/// Which classes are eligible for extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(default, setter(into))]
pub struct ScanOptions {
    /// Namespaces to scan; empty admits every namespace that is not excluded
    #[serde(default = "default_namespace_set")]
    pub include_namespaces: BTreeSet<String>,

    /// Namespaces never scanned; wins over `include_namespaces`
    #[serde(default = "default_namespace_set")]
    pub exclude_namespaces: BTreeSet<String>,

    /// Whether namespace entries also match their dotted descendants
    #[serde(default = "default_scan_nested_namespaces")]
    pub scan_nested_namespaces: bool,

    /// Required suffix of the class name, if any
    #[serde(default)]
    pub entity_suffix: Option<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include_namespaces: default_namespace_set(),
            exclude_namespaces: default_namespace_set(),
            scan_nested_namespaces: default_scan_nested_namespaces(),
            entity_suffix: None,
        }
    }
}

impl ScanOptions {
    pub fn builder() -> ScanOptionsBuilder {
        ScanOptionsBuilder::default()
    }
}

/// Options for one generator run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(default, setter(into))]
pub struct GeneratorOptions {
    /// Name of the generated top-level static class
    #[serde(default = "default_generated_class_name")]
    pub generated_class_name: String,

    /// Appended to every property name to form the constant name
    #[serde(default = "default_length_suffix")]
    pub length_suffix: String,

    /// Emit XML documentation comments in the generated source
    #[serde(default = "default_generate_documentation")]
    pub generate_documentation: bool,

    /// Namespace of the generated source; the assembly name when unset
    #[serde(default)]
    pub namespace: Option<String>,

    #[serde(default)]
    pub scan: ScanOptions,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            generated_class_name: default_generated_class_name(),
            length_suffix: default_length_suffix(),
            generate_documentation: default_generate_documentation(),
            namespace: None,
            scan: ScanOptions::default(),
        }
    }
}

impl GeneratorOptions {
    pub fn builder() -> GeneratorOptionsBuilder {
        GeneratorOptionsBuilder::default()
    }

    /// Checks that every name ends up as valid C# in the generated source
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.generated_class_name) {
            return Err(Error::config(format!(
                "Invalid generated_class_name '{}'. Must be a C# identifier",
                self.generated_class_name
            )));
        }
        if !self.length_suffix.chars().all(is_identifier_part) {
            return Err(Error::config(format!(
                "Invalid length_suffix '{}'. Only letters, digits and '_' are allowed",
                self.length_suffix
            )));
        }
        if let Some(namespace) = &self.namespace {
            if !is_dotted_name(namespace) {
                return Err(Error::config(format!(
                    "Invalid namespace '{namespace}'. Must be a dotted C# name"
                )));
            }
        }
        for namespace in self
            .scan
            .include_namespaces
            .iter()
            .chain(self.scan.exclude_namespaces.iter())
        {
            if !is_dotted_name(namespace) {
                return Err(Error::config(format!(
                    "Invalid scan namespace '{namespace}'. Must be a dotted C# name"
                )));
            }
        }
        Ok(())
    }
}

/// Source locations and output settings for the command-line tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Directories scanned for `.cs` files
    #[serde(default = "default_roots")]
    pub roots: Vec<PathBuf>,

    /// Path of the generated file; `<first root>/<GeneratedClassName>.g.cs` when unset
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Assembly name used as the default namespace; derived from the project when unset
    #[serde(default)]
    pub assembly_name: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            output: None,
            assembly_name: None,
        }
    }
}

/// File watcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Quiet period before a burst of file events is processed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Glob patterns of paths never reported
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Defaults for every generator run
    #[serde(default)]
    pub generator: GeneratorOptions,

    /// Source roots and output location
    #[serde(default)]
    pub project: ProjectConfig,

    /// File watcher configuration
    #[serde(default)]
    pub watcher: WatcherConfig,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        self.generator.validate()?;

        if self.project.roots.is_empty() {
            return Err(Error::config("project.roots must not be empty"));
        }

        if self.watcher.debounce_ms == 0 || self.watcher.debounce_ms > 60_000 {
            return Err(Error::config(format!(
                "Invalid debounce_ms {}. Must be between 1 and 60000",
                self.watcher.debounce_ms
            )));
        }

        for pattern in &self.watcher.ignore_patterns {
            glob_pattern_is_valid(pattern)?;
        }

        Ok(())
    }

    /// Serializes the configuration back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))
    }
}

fn glob_pattern_is_valid(pattern: &str) -> Result<()> {
    glob::Pattern::new(pattern)
        .map(|_| ())
        .map_err(|e| Error::config(format!("Invalid ignore pattern '{pattern}': {e}")))
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether `name` is a C# identifier (keywords are not rejected)
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => chars.all(is_identifier_part),
        _ => false,
    }
}

/// Whether `name` is a dot-separated sequence of identifiers
pub fn is_dotted_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_identifier)
}
