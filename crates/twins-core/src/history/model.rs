use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::GenerationRun;

/// Snapshot of a run, written once when the run is created.
///
/// Serialized in camelCase; `selectedNicknames` is accepted on read so
/// stores written by the earlier web client still load.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub created_at: DateTime<Utc>,
    #[serde(alias = "selectedNicknames")]
    pub persona_display_names: Vec<String>,
    pub prompt_text: String,
}

impl HistoryEntry {
    pub fn new(
        created_at: DateTime<Utc>,
        persona_display_names: Vec<String>,
        prompt_text: impl Into<String>,
    ) -> Self {
        Self {
            created_at,
            persona_display_names,
            prompt_text: prompt_text.into(),
        }
    }
}

impl From<&GenerationRun> for HistoryEntry {
    fn from(run: &GenerationRun) -> Self {
        Self::new(run.created_at(), run.persona_display_names(), run.prompt_text())
    }
}
