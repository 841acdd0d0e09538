use entity_lengths_core::config::{Config, GeneratorOptions, ScanOptions, WatcherConfig};

#[test]
fn test_scan_options_defaults() {
    let scan = ScanOptions::default();
    assert!(scan.include_namespaces.is_empty());
    assert!(scan.exclude_namespaces.is_empty());
    assert!(scan.scan_nested_namespaces);
    assert!(scan.entity_suffix.is_none());
}

#[test]
fn test_watcher_config_defaults() {
    let watcher = WatcherConfig::default();
    assert_eq!(watcher.debounce_ms, 300);
    assert!(watcher.ignore_patterns.iter().any(|p| p == "**/*.g.cs"));
    assert!(watcher.ignore_patterns.iter().any(|p| p == "**/obj/**"));
}

#[test]
fn test_partial_generator_table_keeps_other_defaults() {
    let config = Config::from_toml_str(
        r#"
        [generator.scan]
        scan_nested_namespaces = false
        "#,
    )
    .expect("valid TOML");

    assert!(!config.generator.scan.scan_nested_namespaces);
    assert_eq!(
        config.generator.generated_class_name,
        GeneratorOptions::default().generated_class_name
    );
}

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
}
