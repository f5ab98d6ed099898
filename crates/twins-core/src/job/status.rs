use serde::{Deserialize, Serialize};

/// Opaque identifier assigned by the generation service on submission.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generated media accompanying a result.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaLinks {
    pub video_url: Option<String>,
    pub audio_url: Option<String>,
}

impl MediaLinks {
    pub fn is_empty(&self) -> bool {
        self.video_url.is_none() && self.audio_url.is_none()
    }
}

/// Final output of a completed job.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutput {
    pub hot_take: String,
    #[serde(default)]
    pub media: MediaLinks,
}

impl GenerationOutput {
    pub fn text(hot_take: impl Into<String>) -> Self {
        Self {
            hot_take: hot_take.into(),
            media: MediaLinks::default(),
        }
    }
}

/// Status of a remote job as returned by a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Completed(GenerationOutput),
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}
