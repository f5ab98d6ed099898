//! Job handle domain model.
//!
//! A [`JobHandle`] tracks one persona's unit of remote work from
//! submission to a terminal state. Transitions are validated here so the
//! orchestrator cannot move a handle backwards.

use serde::{Deserialize, Serialize};

use super::status::{JobId, MediaLinks};
use crate::error::{Result, TwinsError};

/// Lifecycle state of a job handle.
///
/// ```text
/// Submitting ──ok──▶ Polling ──Completed──▶ StreamingReveal ──done──▶ Completed
///     │                 │
///     │ submit error    │ Failed / timeout / poll error
///     ▼                 ▼
/// Completed (fallback) Failed
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Submitting,
    Polling,
    StreamingReveal,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether `self -> next` is a legal transition.
    ///
    /// Every non-terminal state may fail (superseded handles fail too).
    /// `Submitting -> Completed` is the fallback path taken when submission
    /// itself fails.
    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;
        match (self, next) {
            (Submitting, Polling) | (Submitting, Completed) => true,
            (Polling, StreamingReveal) => true,
            (StreamingReveal, Completed) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Submitting => "submitting",
            Self::Polling => "polling",
            Self::StreamingReveal => "streaming",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// One persona's job within a generation run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    persona_id: String,
    display_name: String,
    /// Distinguishes this handle from earlier handles of the same persona.
    epoch: u64,
    job_id: Option<JobId>,
    state: JobState,
    revealed_text: String,
    error_message: Option<String>,
    media: Option<MediaLinks>,
    fallback: bool,
}

impl JobHandle {
    /// Creates a handle in `Submitting`.
    pub fn new(persona_id: impl Into<String>, display_name: impl Into<String>, epoch: u64) -> Self {
        Self {
            persona_id: persona_id.into(),
            display_name: display_name.into(),
            epoch,
            job_id: None,
            state: JobState::Submitting,
            revealed_text: String::new(),
            error_message: None,
            media: None,
            fallback: false,
        }
    }

    pub fn persona_id(&self) -> &str {
        &self.persona_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn revealed_text(&self) -> &str {
        &self.revealed_text
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn media(&self) -> Option<&MediaLinks> {
        self.media.as_ref()
    }

    /// True when the displayed text is the locally synthesized fallback.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    fn transition(&mut self, next: JobState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(TwinsError::internal(format!(
                "invalid job transition for '{}': {} -> {}",
                self.persona_id, self.state, next
            )));
        }
        self.state = next;
        Ok(())
    }

    /// Submission succeeded; the handle now waits on the poll loop.
    pub fn mark_submitted(&mut self, job_id: JobId) -> Result<()> {
        self.transition(JobState::Polling)?;
        self.job_id = Some(job_id);
        Ok(())
    }

    /// The remote job completed; the reveal starts from an empty prefix.
    pub fn begin_reveal(&mut self, media: MediaLinks) -> Result<()> {
        self.transition(JobState::StreamingReveal)?;
        self.revealed_text.clear();
        self.media = (!media.is_empty()).then_some(media);
        Ok(())
    }

    /// Applies a reveal tick.
    ///
    /// Returns `false` and leaves the text untouched unless the handle is
    /// streaming and `partial` extends the text revealed so far.
    pub fn apply_reveal(&mut self, partial: &str) -> bool {
        if self.state != JobState::StreamingReveal
            || partial.len() <= self.revealed_text.len()
            || !partial.starts_with(self.revealed_text.as_str())
        {
            return false;
        }
        self.revealed_text = partial.to_string();
        true
    }

    /// The reveal finished; `full_text` is the complete result.
    pub fn finish_reveal(&mut self, full_text: &str) -> Result<()> {
        self.transition(JobState::Completed)?;
        self.revealed_text = full_text.to_string();
        Ok(())
    }

    /// Submission failed; show the canned fallback instead of an empty result.
    pub fn complete_with_fallback(&mut self, text: impl Into<String>) -> Result<()> {
        self.transition(JobState::Completed)?;
        self.revealed_text = text.into();
        self.fallback = true;
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        self.transition(JobState::Failed)?;
        self.error_message = Some(message.into());
        Ok(())
    }
}
