//! Key-value persistence trait.

use crate::error::StorageError;

/// A minimal string key-value store.
///
/// Stands in for browser-style local storage: one opaque string value per
/// key. Implementations decide where the bytes live (files, memory).
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))`: value present
    /// - `Ok(None)`: nothing stored under `key`
    /// - `Err(StorageError)`: the store could not be read
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
