use std::sync::Arc;

use tokio::sync::RwLock;
use twins_core::config::HistoryConfig;
use twins_core::error::StorageError;
use twins_core::history::{HistoryEntry, KeyValueStore};

/// Capacity-bounded, persisted list of past runs, most recent first.
///
/// The in-memory list is authoritative for the running process; the store
/// is written through on every `record`. Storage failures are logged and
/// absorbed, never returned.
pub struct SessionHistoryCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
    capacity: usize,
    entries: RwLock<Vec<HistoryEntry>>,
}

impl SessionHistoryCache {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &HistoryConfig) -> Self {
        Self {
            store,
            key: config.storage_key.clone(),
            capacity: config.capacity,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Restores entries from the store.
    ///
    /// Missing, unreadable or malformed data yields an empty history.
    /// Returns the number of entries restored.
    pub async fn load(&self) -> usize {
        let restored = match self.read_store().await {
            Ok(mut entries) => {
                entries.truncate(self.capacity);
                entries
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "discarding unreadable history");
                Vec::new()
            }
        };
        let count = restored.len();
        *self.entries.write().await = restored;
        count
    }

    async fn read_store(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        match self.store.get(&self.key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Prepends `entry`, evicts the oldest beyond capacity, and persists.
    ///
    /// The write lock is held until the store has been written, so
    /// concurrent records reach the store in the same order as memory.
    pub async fn record(&self, entry: HistoryEntry) {
        let mut entries = self.entries.write().await;
        entries.insert(0, entry);
        entries.truncate(self.capacity);

        let result = match serde_json::to_string(&*entries) {
            Ok(json) => self.store.set(&self.key, &json).await,
            Err(e) => Err(e.into()),
        };
        drop(entries);
        if let Err(e) = result {
            tracing::warn!(key = %self.key, error = %e, "failed to persist history");
        }
    }

    /// Entries, most recent first.
    pub async fn list(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.clone()
    }
}
