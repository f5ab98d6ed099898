//! Messages between per-job tasks and the orchestrator, and the updates it
//! publishes to the display layer.

use uuid::Uuid;
use twins_core::error::{PollError, SubmitError};
use twins_core::job::{JobHandle, JobId, JobState, JobStatus, MediaLinks};

/// Identifies one handle generation of a persona within a run.
///
/// Events whose key no longer matches the persona's active handle are
/// stale and get dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct JobKey {
    pub run_id: Uuid,
    pub persona_id: String,
    pub epoch: u64,
}

#[derive(Debug)]
pub(crate) enum JobEventKind {
    Submitted(Result<JobId, SubmitError>),
    Polled(Result<JobStatus, PollError>),
    Revealed { partial: String, done: bool },
}

#[derive(Debug)]
pub(crate) struct JobEvent {
    pub key: JobKey,
    pub kind: JobEventKind,
}

/// Snapshot of a handle after a state or reveal change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobUpdate {
    pub run_id: Uuid,
    pub persona_id: String,
    pub display_name: String,
    pub state: JobState,
    pub revealed_text: String,
    pub error_message: Option<String>,
    pub media: Option<MediaLinks>,
    pub fallback: bool,
}

impl JobUpdate {
    pub(crate) fn from_handle(run_id: Uuid, handle: &JobHandle) -> Self {
        Self {
            run_id,
            persona_id: handle.persona_id().to_string(),
            display_name: handle.display_name().to_string(),
            state: handle.state(),
            revealed_text: handle.revealed_text().to_string(),
            error_message: handle.error_message().map(str::to_string),
            media: handle.media().cloned(),
            fallback: handle.is_fallback(),
        }
    }
}
