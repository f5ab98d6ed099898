use tempfile::TempDir;
use twins_core::error::StorageError;
use twins_core::history::KeyValueStore;
use twins_infrastructure::FileKeyValueStore;

#[tokio::test]
async fn test_missing_key_reads_as_none() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileKeyValueStore::new(temp_dir.path());

    assert!(store.get("dt_sessions").await.unwrap().is_none());
}

#[tokio::test]
async fn test_value_survives_new_store_instance() {
    let temp_dir = TempDir::new().unwrap();

    FileKeyValueStore::new(temp_dir.path())
        .set("dt_sessions", r#"[{"promptText":"idea"}]"#)
        .await
        .unwrap();

    let reopened = FileKeyValueStore::new(temp_dir.path());
    assert_eq!(
        reopened.get("dt_sessions").await.unwrap().as_deref(),
        Some(r#"[{"promptText":"idea"}]"#)
    );
    assert!(temp_dir.path().join("dt_sessions.json").exists());
}

#[tokio::test]
async fn test_overwrite_replaces_value() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileKeyValueStore::new(temp_dir.path());

    store.set("k", "first").await.unwrap();
    store.set("k", "second").await.unwrap();

    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("second"));
}

#[tokio::test]
async fn test_rejects_path_like_keys() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileKeyValueStore::new(temp_dir.path());

    for key in ["../escape", "a/b", "", ".hidden"] {
        let err = store.set(key, "x").await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)), "key {key:?}");
    }
}

#[tokio::test]
async fn test_root_is_created_lazily() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("not").join("yet");
    let store = FileKeyValueStore::new(&root);

    store.set("k", "v").await.unwrap();

    assert!(root.join("k.json").exists());
}
