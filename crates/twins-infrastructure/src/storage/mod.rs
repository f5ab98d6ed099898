//! Key-value storage backends.
//!
//! - `atomic_file`: tmp-file + rename writes shared by the file store
//! - `file_store`: one JSON document per key under a directory
//! - `memory_store`: process-local store for ephemeral sessions

pub mod atomic_file;
mod file_store;
mod memory_store;

pub use file_store::FileKeyValueStore;
pub use memory_store::MemoryKeyValueStore;
