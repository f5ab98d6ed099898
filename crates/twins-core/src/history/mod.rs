//! Session history domain module.
//!
//! - `model`: the immutable `HistoryEntry` snapshot
//! - `store`: the key-value persistence capability history is written to

mod model;
mod store;

pub use model::HistoryEntry;
pub use store::KeyValueStore;
