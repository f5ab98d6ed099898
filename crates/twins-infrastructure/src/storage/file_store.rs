//! File-backed key-value store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use twins_core::error::StorageError;
use twins_core::history::KeyValueStore;

use super::atomic_file::{read_optional, write_atomic};

/// Stores each key as `<root>/<key>.json`.
///
/// Keys are restricted to `[A-Za-z0-9_.-]` so they map to a single file
/// name. Writes within the process are serialized.
pub struct FileKeyValueStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StorageError::Unavailable(format!("invalid storage key '{}'", key)));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        Ok(read_optional(&path).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock().await;
        write_atomic(&path, value.as_bytes()).await?;
        tracing::debug!(key, path = %path.display(), "stored value");
        Ok(())
    }
}
