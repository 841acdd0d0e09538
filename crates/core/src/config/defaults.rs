//! Default values and functions for configuration

use std::collections::BTreeSet;
use std::path::PathBuf;

// Default constants
pub const DEFAULT_GENERATED_CLASS_NAME: &str = "EntityLengths";
pub const DEFAULT_LENGTH_SUFFIX: &str = "Length";
pub(crate) const DEFAULT_CONFIG_FILE: &str = "entity-lengths.toml";
pub(crate) const ENV_PREFIX: &str = "ENTITY_LENGTHS";

pub(crate) fn default_generated_class_name() -> String {
    DEFAULT_GENERATED_CLASS_NAME.to_string()
}

pub(crate) fn default_length_suffix() -> String {
    DEFAULT_LENGTH_SUFFIX.to_string()
}

pub(crate) fn default_generate_documentation() -> bool {
    false
}

pub(crate) fn default_scan_nested_namespaces() -> bool {
    true
}

pub(crate) fn default_namespace_set() -> BTreeSet<String> {
    BTreeSet::new()
}

pub(crate) fn default_roots() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}

pub(crate) fn default_debounce_ms() -> u64 {
    300
}

pub(crate) fn default_ignore_patterns() -> Vec<String> {
    vec![
        "**/bin/**".to_string(),
        "**/obj/**".to_string(),
        "**/.git/**".to_string(),
        "**/*.g.cs".to_string(),
    ]
}
