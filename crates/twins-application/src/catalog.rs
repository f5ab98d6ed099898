//! Persona catalog.
//!
//! Starts from the built-in presets and can be replaced by the service's
//! catalog. A failed or empty refresh keeps whatever was there before.

use twins_core::error::{Result, TwinsError};
use twins_core::persona::{PersonaRef, get_default_presets};
use twins_core::service::GenerationService;

#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    personas: Vec<PersonaRef>,
}

impl PersonaCatalog {
    /// Catalog holding only the built-in presets.
    pub fn builtin() -> Self {
        Self {
            personas: get_default_presets(),
        }
    }

    pub fn from_personas(personas: Vec<PersonaRef>) -> Self {
        Self { personas }
    }

    /// Replaces the catalog with the service's personas.
    ///
    /// Returns `true` if the remote catalog was applied.
    pub async fn refresh(&mut self, service: &dyn GenerationService) -> bool {
        match service.fetch_personas().await {
            Ok(personas) if !personas.is_empty() => {
                tracing::info!(count = personas.len(), "loaded remote persona catalog");
                self.personas = personas;
                true
            }
            Ok(_) => {
                tracing::warn!("remote persona catalog is empty, keeping current catalog");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch personas, keeping current catalog");
                false
            }
        }
    }

    pub fn all(&self) -> &[PersonaRef] {
        &self.personas
    }

    pub fn get(&self, id: &str) -> Option<&PersonaRef> {
        self.personas.iter().find(|p| p.id == id)
    }

    /// Resolves ids to personas, preserving order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for the first unknown id.
    pub fn resolve(&self, ids: &[String]) -> Result<Vec<PersonaRef>> {
        ids.iter()
            .map(|id| {
                self.get(id)
                    .cloned()
                    .ok_or_else(|| TwinsError::not_found("persona", id.clone()))
            })
            .collect()
    }
}

impl Default for PersonaCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedService;
    use twins_core::error::PollError;
    use twins_core::persona::PersonaSource;

    #[tokio::test]
    async fn test_refresh_replaces_builtin() {
        let service = ScriptedService::new().with_personas(Ok(vec![
            PersonaRef::new("chad_goldstein", "Chad").with_source(PersonaSource::Remote),
        ]));
        let mut catalog = PersonaCatalog::builtin();

        assert!(catalog.refresh(&service).await);
        assert_eq!(catalog.all().len(), 1);
        assert!(catalog.get("chad_goldstein").is_some());
        assert!(catalog.get("sarah").is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_builtin() {
        let service =
            ScriptedService::new().with_personas(Err(PollError::Transport("refused".into())));
        let mut catalog = PersonaCatalog::builtin();

        assert!(!catalog.refresh(&service).await);
        assert_eq!(catalog.all().len(), 4);
    }

    #[tokio::test]
    async fn test_empty_refresh_keeps_builtin() {
        let service = ScriptedService::new().with_personas(Ok(Vec::new()));
        let mut catalog = PersonaCatalog::builtin();

        assert!(!catalog.refresh(&service).await);
        assert!(catalog.get("kanu").is_some());
    }

    #[test]
    fn test_resolve_preserves_order_and_rejects_unknown() {
        let catalog = PersonaCatalog::builtin();

        let resolved = catalog
            .resolve(&["leigh".to_string(), "sarah".to_string()])
            .unwrap();
        assert_eq!(resolved[0].display_name, "The Early Signal");
        assert_eq!(resolved[1].display_name, "The Pitch Surgeon");

        let err = catalog.resolve(&["nobody".to_string()]).unwrap_err();
        assert!(err.is_not_found());
    }
}
