//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use twins_core::error::StorageError;
use twins_core::history::KeyValueStore;

/// Process-local store; contents vanish when the process exits.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self
            .values
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
