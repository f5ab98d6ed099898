//! Generation run domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::JobHandle;
use crate::error::{Result, TwinsError};
use crate::persona::PersonaRef;

/// One "submit" action: a prompt sent to one or more personas.
///
/// The run itself never changes after creation; only its job handles move
/// through their state machines.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GenerationRun {
    id: Uuid,
    created_at: DateTime<Utc>,
    prompt_text: String,
    personas: Vec<PersonaRef>,
    jobs: Vec<JobHandle>,
}

impl GenerationRun {
    /// Creates a run with one `Submitting` handle per persona.
    ///
    /// `epoch_for` assigns each handle its supersede epoch.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `personas` is empty, contains the
    /// same id twice, or the prompt is blank.
    pub fn new(
        prompt_text: impl Into<String>,
        personas: Vec<PersonaRef>,
        mut epoch_for: impl FnMut(&PersonaRef) -> u64,
    ) -> Result<Self> {
        let prompt_text = prompt_text.into();
        if prompt_text.trim().is_empty() {
            return Err(TwinsError::validation("prompt text must not be empty"));
        }
        if personas.is_empty() {
            return Err(TwinsError::validation("at least one persona must be selected"));
        }
        for (i, persona) in personas.iter().enumerate() {
            if personas[..i].iter().any(|p| p.id == persona.id) {
                return Err(TwinsError::validation(format!(
                    "persona '{}' selected more than once",
                    persona.id
                )));
            }
        }

        let jobs = personas
            .iter()
            .map(|p| JobHandle::new(p.id.clone(), p.display_name.clone(), epoch_for(p)))
            .collect();

        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            prompt_text,
            personas,
            jobs,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    pub fn personas(&self) -> &[PersonaRef] {
        &self.personas
    }

    pub fn persona_display_names(&self) -> Vec<String> {
        self.personas.iter().map(|p| p.display_name.clone()).collect()
    }

    pub fn jobs(&self) -> &[JobHandle] {
        &self.jobs
    }

    pub fn job(&self, persona_id: &str) -> Option<&JobHandle> {
        self.jobs.iter().find(|j| j.persona_id() == persona_id)
    }

    pub fn job_mut(&mut self, persona_id: &str) -> Option<&mut JobHandle> {
        self.jobs.iter_mut().find(|j| j.persona_id() == persona_id)
    }

    /// Replaces the handle for `persona_id` with a fresh `Submitting` one.
    ///
    /// Returns `None` if the persona is not part of this run.
    pub fn restart_job(&mut self, persona_id: &str, epoch: u64) -> Option<&mut JobHandle> {
        let slot = self.jobs.iter_mut().find(|j| j.persona_id() == persona_id)?;
        *slot = JobHandle::new(slot.persona_id().to_string(), slot.display_name().to_string(), epoch);
        Some(slot)
    }

    /// True once every handle is `Completed` or `Failed`.
    pub fn is_settled(&self) -> bool {
        self.jobs.iter().all(JobHandle::is_terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobState;

    fn personas() -> Vec<PersonaRef> {
        vec![
            PersonaRef::new("sarah", "The Pitch Surgeon"),
            PersonaRef::new("kanu", "The Builder's Whisperer"),
        ]
    }

    #[test]
    fn test_one_handle_per_persona() {
        let mut epoch = 0;
        let run = GenerationRun::new("An AI for JIRA tickets", personas(), |_| {
            epoch += 1;
            epoch
        })
        .unwrap();

        assert_eq!(run.jobs().len(), 2);
        assert!(run.jobs().iter().all(|j| j.state() == JobState::Submitting));
        assert_eq!(run.job("kanu").map(JobHandle::epoch), Some(2));
        assert!(!run.is_settled());
    }

    #[test]
    fn test_rejects_empty_selection() {
        let err = GenerationRun::new("idea", Vec::new(), |_| 0).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_rejects_blank_prompt() {
        assert!(GenerationRun::new("   ", personas(), |_| 0).is_err());
    }

    #[test]
    fn test_rejects_duplicate_persona() {
        let mut dup = personas();
        dup.push(PersonaRef::new("sarah", "Again"));
        assert!(GenerationRun::new("idea", dup, |_| 0).is_err());
    }

    #[test]
    fn test_restart_job_resets_handle() {
        let mut run = GenerationRun::new("idea", personas(), |_| 1).unwrap();
        run.job_mut("sarah").unwrap().fail("timeout").unwrap();

        let restarted = run.restart_job("sarah", 7).unwrap();
        assert_eq!(restarted.state(), JobState::Submitting);
        assert_eq!(restarted.epoch(), 7);
        assert!(restarted.error_message().is_none());
        assert!(run.restart_job("nobody", 8).is_none());
    }
}
