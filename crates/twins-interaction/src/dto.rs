//! Wire shapes of the generation service.
//!
//! Kept separate from the domain model; conversion happens in the
//! `into_*` helpers so the client never leaks HTTP field names upward.

use serde::{Deserialize, Serialize};
use twins_core::error::PollError;
use twins_core::job::{GenerationOutput, JobStatus, MediaLinks};
use twins_core::persona::{PersonaRef, PersonaSource};

#[derive(Debug, Deserialize)]
pub(crate) struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProcessTextRequest<'a> {
    pub text: &'a str,
    pub context: &'a str,
    pub persona_id: &'a str,
    pub output_filename: String,
    pub use_heygen_voice: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProcessTextResponse {
    #[serde(default)]
    pub job_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobResults {
    #[serde(default)]
    pub hot_take: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobResponse {
    pub status: String,
    #[serde(default)]
    pub results: Option<JobResults>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobResponse {
    /// Maps the service's status string onto [`JobStatus`].
    ///
    /// Any status other than `completed` or `failed` is still pending.
    pub fn into_status(self) -> Result<JobStatus, PollError> {
        match self.status.as_str() {
            "completed" => {
                let results = self.results.ok_or_else(|| {
                    PollError::Malformed("completed job without results".to_string())
                })?;
                let hot_take = results.hot_take.ok_or_else(|| {
                    PollError::Malformed("completed job without hot_take".to_string())
                })?;
                Ok(JobStatus::Completed(GenerationOutput {
                    hot_take,
                    media: MediaLinks {
                        video_url: results.video_url,
                        audio_url: results.audio_url,
                    },
                }))
            }
            "failed" => Ok(JobStatus::Failed(
                self.error
                    .unwrap_or_else(|| "generation failed".to_string()),
            )),
            _ => Ok(JobStatus::Pending),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PersonaDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<PersonaDto> for PersonaRef {
    fn from(dto: PersonaDto) -> Self {
        let display_name = dto
            .nickname
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(dto.name);
        let persona = PersonaRef::new(dto.id, display_name).with_source(PersonaSource::Remote);
        match dto.description {
            Some(description) => persona.with_description(description),
            None => persona,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PersonasResponse {
    pub personas: Vec<PersonaDto>,
}
