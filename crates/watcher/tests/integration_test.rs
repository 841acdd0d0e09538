//! Integration tests for the file watcher
//!
//! These tests use temporary directories and real filesystem operations
//! to validate the watcher's behavior in realistic scenarios.

use entity_lengths_watcher::{FileChange, FileWatcher, WatcherConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::timeout;

fn watcher_config() -> WatcherConfig {
    WatcherConfig::builder().debounce_ms(50).build()
}

/// Helper to create a test file
async fn create_test_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    tokio::fs::write(&path, content).await.unwrap();
    path
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Next change, or `None` when nothing arrives within `wait`
async fn next_change(events: &mut mpsc::Receiver<FileChange>, wait: Duration) -> Option<FileChange> {
    timeout(wait, events.recv()).await.ok().flatten()
}

/// Collects changes until the channel stays quiet for `quiet`
async fn drain(events: &mut mpsc::Receiver<FileChange>, quiet: Duration) -> Vec<FileChange> {
    let mut changes = Vec::new();
    while let Some(change) = next_change(events, quiet).await {
        changes.push(change);
    }
    changes
}

#[tokio::test]
async fn test_file_creation_detection() {
    let temp_dir = TempDir::new().unwrap();
    let mut watcher = FileWatcher::new(watcher_config()).unwrap();
    let mut events = watcher.watch(temp_dir.path()).unwrap();

    // Wait a bit for watcher to stabilize
    tokio::time::sleep(Duration::from_millis(100)).await;

    create_test_file(temp_dir.path(), "User.cs", "public class User { }").await;

    let event = next_change(&mut events, Duration::from_secs(2))
        .await
        .expect("no event received");
    match event {
        FileChange::Created(path) => assert_eq!(file_name(&path), "User.cs"),
        other => panic!("Expected Created event, got {other:?}"),
    }
}

#[tokio::test]
async fn test_file_modification_detection() {
    let temp_dir = TempDir::new().unwrap();
    let test_file = create_test_file(temp_dir.path(), "User.cs", "public class User { }").await;

    let mut watcher = FileWatcher::new(watcher_config()).unwrap();
    let mut events = watcher.watch(temp_dir.path()).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    tokio::fs::write(&test_file, "public class User { public string Name { get; set; } }")
        .await
        .unwrap();

    let event = next_change(&mut events, Duration::from_secs(2))
        .await
        .expect("no event received");
    assert!(
        matches!(&event, FileChange::Modified(path) if file_name(path) == "User.cs"),
        "Expected Modified event, got {event:?}"
    );
}

#[tokio::test]
async fn test_file_deletion_detection() {
    let temp_dir = TempDir::new().unwrap();
    let test_file = create_test_file(temp_dir.path(), "User.cs", "public class User { }").await;

    let mut watcher = FileWatcher::new(watcher_config()).unwrap();
    let mut events = watcher.watch(temp_dir.path()).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    tokio::fs::remove_file(&test_file).await.unwrap();

    let event = next_change(&mut events, Duration::from_secs(2))
        .await
        .expect("no event received");
    assert!(
        matches!(&event, FileChange::Deleted(path) if file_name(path) == "User.cs"),
        "Expected Deleted event, got {event:?}"
    );
}

#[tokio::test]
async fn test_debouncing() {
    let temp_dir = TempDir::new().unwrap();
    let test_file = create_test_file(temp_dir.path(), "User.cs", "public class User { }").await;

    let config = WatcherConfig::builder().debounce_ms(300).build();
    let mut watcher = FileWatcher::new(config).unwrap();
    let mut events = watcher.watch(temp_dir.path()).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Burst of writes well inside one debounce window
    for i in 0..5 {
        tokio::fs::write(&test_file, format!("public class User {{ /* {i} */ }}"))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let changes = drain(&mut events, Duration::from_millis(800)).await;
    assert_eq!(changes.len(), 1, "Expected one debounced change, got {changes:?}");
}

#[tokio::test]
async fn test_non_source_files_are_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let mut watcher = FileWatcher::new(watcher_config()).unwrap();
    let mut events = watcher.watch(temp_dir.path()).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    create_test_file(temp_dir.path(), "README.md", "# App").await;
    create_test_file(temp_dir.path(), "EntityLengths.g.cs", "// <auto-generated/>").await;
    create_test_file(temp_dir.path(), "Blog.cs", "public class Blog { }").await;

    let changes = drain(&mut events, Duration::from_millis(500)).await;
    let names: Vec<String> = changes.iter().map(|change| file_name(change.path())).collect();
    assert_eq!(names, vec!["Blog.cs".to_string()]);
}

#[tokio::test]
async fn test_recursive_watching() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("Domain").join("Orders");
    tokio::fs::create_dir_all(&nested).await.unwrap();

    let mut watcher = FileWatcher::new(watcher_config()).unwrap();
    let mut events = watcher.watch(temp_dir.path()).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    create_test_file(&nested, "Order.cs", "public class Order { }").await;

    let changes = drain(&mut events, Duration::from_millis(500)).await;
    assert!(
        changes
            .iter()
            .any(|change| file_name(change.path()) == "Order.cs"),
        "Expected an event for the nested file, got {changes:?}"
    );
}
