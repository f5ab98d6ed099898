//! HttpGenerationClient - REST client for the Digital Twins generation backend.
//!
//! Each operation issues exactly one request. Retry and timeout policy for
//! jobs lives in the orchestrator; this layer only types the outcome.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use twins_core::config::{DEFAULT_BASE_URL, ServiceConfig};
use twins_core::error::{PollError, SubmitError};
use twins_core::job::{JobId, JobStatus};
use twins_core::persona::PersonaRef;
use twins_core::service::{GenerationService, HistoryPage, HistoryQuery};
use uuid::Uuid;

use crate::dto::{
    HealthResponse, JobResponse, PersonasResponse, ProcessTextRequest, ProcessTextResponse,
};

/// Client implementation of [`GenerationService`] over HTTP/JSON.
#[derive(Clone)]
pub struct HttpGenerationClient {
    client: Client,
    base_url: String,
    context: String,
    use_heygen_voice: bool,
    request_timeout: Duration,
}

impl HttpGenerationClient {
    /// Creates a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            context: String::new(),
            use_heygen_voice: false,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Creates a client from the `[service]` configuration section.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(&config.base_url)
            .with_context(&config.context)
            .with_heygen_voice(config.use_heygen_voice)
            .with_request_timeout(config.request_timeout())
    }

    /// Sets the context string sent with every submission.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_heygen_voice(mut self, enabled: bool) -> Self {
        self.use_heygen_voice = enabled;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).timeout(self.request_timeout)
    }

    /// Sends a read-only request and decodes a JSON body.
    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, PollError> {
        let response = request
            .send()
            .await
            .map_err(|e| PollError::Transport(e.to_string()))?;
        let response = ensure_success(response)
            .await
            .map_err(|(status, message)| PollError::Rejected { status, message })?;

        response
            .json::<T>()
            .await
            .map_err(|e| PollError::Malformed(e.to_string()))
    }
}

impl Default for HttpGenerationClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Returns the response if its status is 2xx, otherwise `(status, body)`.
async fn ensure_success(response: Response) -> Result<Response, (u16, String)> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err((status.as_u16(), body))
}

#[async_trait]
impl GenerationService for HttpGenerationClient {
    async fn submit(&self, persona_id: &str, prompt_text: &str) -> Result<JobId, SubmitError> {
        let body = ProcessTextRequest {
            text: prompt_text,
            context: &self.context,
            persona_id,
            output_filename: format!("{}_{}", persona_id, Uuid::new_v4().simple()),
            use_heygen_voice: self.use_heygen_voice,
        };

        let response = self
            .client
            .post(self.url("/process-text"))
            .json(&body)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let response = ensure_success(response)
            .await
            .map_err(|(status, message)| SubmitError::Rejected { status, message })?;

        let parsed: ProcessTextResponse =
            response.json().await.map_err(|e| SubmitError::Rejected {
                status,
                message: format!("Failed to parse submission response: {}", e),
            })?;

        match parsed.job_id.filter(|id| !id.is_empty()) {
            Some(job_id) => {
                tracing::debug!(persona_id, job_id = %job_id, "job submitted");
                Ok(JobId::new(job_id))
            }
            None => Err(SubmitError::Rejected {
                status,
                message: "response did not contain a job_id".to_string(),
            }),
        }
    }

    async fn poll_status(&self, job_id: &JobId) -> Result<JobStatus, PollError> {
        let path = format!("/job/{}", job_id);
        let response: JobResponse = self.get_json(self.get(&path)).await?;
        response.into_status()
    }

    async fn check_health(&self) -> bool {
        let result: Result<HealthResponse, PollError> = self.get_json(self.get("/health")).await;
        match result {
            Ok(health) => health.is_healthy(),
            Err(e) => {
                tracing::debug!(error = %e, "health check failed");
                false
            }
        }
    }

    async fn fetch_personas(&self) -> Result<Vec<PersonaRef>, PollError> {
        let response: PersonasResponse = self.get_json(self.get("/personas")).await?;
        Ok(response.personas.into_iter().map(PersonaRef::from).collect())
    }

    async fn fetch_history(&self, query: &HistoryQuery) -> Result<HistoryPage, PollError> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("per_page", query.per_page.to_string()),
            ("days", query.days.to_string()),
        ];
        if let Some(persona_id) = &query.persona_id {
            params.push(("persona_id", persona_id.clone()));
        }

        self.get_json(self.get("/history").query(&params)).await
    }
}
