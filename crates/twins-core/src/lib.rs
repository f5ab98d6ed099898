//! Domain model for the Digital Twins feedback orchestrator.
//!
//! This crate holds the data entities shared by every layer (personas,
//! job handles, generation runs, history entries, the availability
//! signal), the error taxonomy, configuration types, and the two seams
//! the application layer is written against:
//!
//! - [`service::GenerationService`]: the remote generation backend
//! - [`history::KeyValueStore`]: the local persistence capability

pub mod availability;
pub mod config;
pub mod error;
pub mod history;
pub mod job;
pub mod persona;
pub mod service;

pub use availability::AvailabilitySignal;
pub use error::{PollError, PollTimeout, Result, StorageError, SubmitError, TwinsError};
pub use history::{HistoryEntry, KeyValueStore};
pub use job::{GenerationOutput, GenerationRun, JobHandle, JobId, JobState, JobStatus, MediaLinks};
pub use persona::PersonaRef;
pub use service::{GenerationService, HistoryPage, HistoryQuery};
