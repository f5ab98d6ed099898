//! Application services for the Digital Twins orchestrator.
//!
//! - [`JobOrchestrator`]: submits one job per persona, polls, reveals,
//!   supersedes and retires handles
//! - [`StreamingPresenter`]: simulated progressive disclosure of a result
//! - [`AvailabilityMonitor`]: periodic health probing
//! - [`SessionHistoryCache`]: bounded, persisted record of past runs
//! - [`PersonaCatalog`]: built-in personas refreshed from the service

pub mod availability;
pub mod catalog;
pub mod history_cache;
pub mod orchestrator;
pub mod presenter;

#[cfg(test)]
mod test_support;

pub use availability::{AvailabilityMonitor, ProbeOutcome};
pub use catalog::PersonaCatalog;
pub use history_cache::SessionHistoryCache;
pub use orchestrator::{JobOrchestrator, JobUpdate, RunStarted};
pub use presenter::{RevealFrames, RevealOutcome, StreamingPresenter};
