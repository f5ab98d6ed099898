//! Job domain module.
//!
//! - `model`: per-persona job handle and its state machine
//! - `status`: remote job status as reported by the service
//! - `run`: one user-initiated generation run

mod model;
mod run;
mod status;

pub use model::{JobHandle, JobState};
pub use run::GenerationRun;
pub use status::{GenerationOutput, JobId, JobStatus, MediaLinks};
