//! Generation service trait.
//!
//! Defines the contract with the remote generation backend, decoupling the
//! orchestrator from HTTP. Every method is a suspension point and must not
//! block unrelated work.

use serde::{Deserialize, Serialize};

use crate::error::{PollError, SubmitError};
use crate::job::{JobId, JobStatus};
use crate::persona::PersonaRef;

/// Query for one page of the service-side history.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub page: u32,
    pub per_page: u32,
    pub days: u32,
    #[serde(default)]
    pub persona_id: Option<String>,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            days: 30,
            persona_id: None,
        }
    }
}

/// One page of service-side history. Items are passed through untouched.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub items: Vec<serde_json::Value>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

/// Remote generation backend.
///
/// # Implementation Notes
///
/// - `submit` issues exactly one request and never retries.
/// - `poll_status` must be idempotent.
/// - `check_health` is best-effort and never fails; any error is `false`.
#[async_trait::async_trait]
pub trait GenerationService: Send + Sync {
    /// Creates a remote job for `persona_id`.
    async fn submit(&self, persona_id: &str, prompt_text: &str) -> Result<JobId, SubmitError>;

    /// Reads the current status of `job_id`.
    async fn poll_status(&self, job_id: &JobId) -> Result<JobStatus, PollError>;

    async fn check_health(&self) -> bool;

    /// Fetches the remote persona catalog.
    async fn fetch_personas(&self) -> Result<Vec<PersonaRef>, PollError>;

    /// Fetches one page of service-side generation history.
    async fn fetch_history(&self, query: &HistoryQuery) -> Result<HistoryPage, PollError>;
}
