//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;
use tracing::debug;

use super::defaults::*;
use super::Config;

/// Keys whose environment values are comma separated lists
const LIST_KEYS: [&str; 4] = [
    "generator.scan.include_namespaces",
    "generator.scan.exclude_namespaces",
    "project.roots",
    "watcher.ignore_patterns",
];

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `ENTITY_LENGTHS_` and use double
    /// underscores for nested values. For example:
    /// - `ENTITY_LENGTHS_GENERATOR__GENERATED_CLASS_NAME=MaxLengths`
    /// - `ENTITY_LENGTHS_GENERATOR__SCAN__EXCLUDE_NAMESPACES=App.Legacy,App.Tests`
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        let builder = set_config_default(
            builder,
            "generator.generated_class_name",
            default_generated_class_name(),
        )?;
        let builder =
            set_config_default(builder, "generator.length_suffix", default_length_suffix())?;
        let builder = set_config_default(
            builder,
            "generator.generate_documentation",
            default_generate_documentation(),
        )?;
        let builder = set_config_default(
            builder,
            "generator.scan.scan_nested_namespaces",
            default_scan_nested_namespaces(),
        )?;
        let mut builder = set_config_default(
            builder,
            "watcher.debounce_ms",
            default_debounce_ms() as i64,
        )?;

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        let mut environment = Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .list_separator(",")
            .try_parsing(true);
        for key in LIST_KEYS {
            environment = environment.with_list_parse_key(key);
        }
        builder = builder.add_source(environment);

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load and validate configuration
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (`entity-lengths.toml` in the working directory or a custom path)
    /// 3. Environment variables (`ENTITY_LENGTHS_*`)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::config(format!(
                        "Config file {} does not exist",
                        p.display()
                    )));
                }
                p.to_path_buf()
            }
            None => Path::new(DEFAULT_CONFIG_FILE).to_path_buf(),
        };
        let config = Self::from_file(&path)?;
        config.validate()?;
        debug!(
            "Loaded configuration (file {}: {})",
            path.display(),
            if path.exists() { "found" } else { "absent" }
        );
        Ok(config)
    }
}
