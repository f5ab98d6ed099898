//! Persona domain model.
//!
//! A persona is a named response profile the generation service can
//! impersonate. The orchestrator only ever reads personas; the catalog that
//! owns them is either built in or fetched from the service.

use serde::{Deserialize, Serialize};

/// Where a persona reference came from.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PersonaSource {
    /// Compiled-in preset
    #[default]
    BuiltIn,
    /// Fetched from `GET /personas`
    Remote,
}

/// Immutable reference to a persona.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PersonaRef {
    /// Unique key, also used as `persona_id` on the wire
    pub id: String,
    /// Label shown to the user (nickname when the catalog provides one)
    pub display_name: String,
    /// One-line description of the persona's angle
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: PersonaSource,
}

impl PersonaRef {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: None,
            source: PersonaSource::BuiltIn,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_source(mut self, source: PersonaSource) -> Self {
        self.source = source;
        self
    }
}
