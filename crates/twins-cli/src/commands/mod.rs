pub mod health;
pub mod history;
pub mod personas;
pub mod run;

use std::sync::Arc;

use twins_core::config::TwinsConfig;
use twins_core::history::KeyValueStore;
use twins_core::service::GenerationService;
use twins_infrastructure::{FileKeyValueStore, MemoryKeyValueStore, TwinsPaths};
use twins_interaction::HttpGenerationClient;

pub fn generation_service(config: &TwinsConfig) -> Arc<dyn GenerationService> {
    Arc::new(HttpGenerationClient::from_config(&config.service))
}

/// File store under the platform data directory, or an in-memory store
/// when no data directory can be resolved.
pub fn history_store() -> Arc<dyn KeyValueStore> {
    match TwinsPaths::storage_dir() {
        Ok(dir) => Arc::new(FileKeyValueStore::new(dir)),
        Err(e) => {
            tracing::warn!(error = %e, "history will not be persisted");
            Arc::new(MemoryKeyValueStore::new())
        }
    }
}
