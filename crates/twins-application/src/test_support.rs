//! Scripted generation service for application tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use twins_core::error::{PollError, SubmitError};
use twins_core::job::{GenerationOutput, JobId, JobStatus};
use twins_core::persona::PersonaRef;
use twins_core::service::{GenerationService, HistoryPage, HistoryQuery};

/// Answers come from per-persona / per-job queues. Unscripted submissions
/// succeed with `job-<persona>`, exhausted poll queues answer `Pending`.
#[derive(Default)]
pub(crate) struct ScriptedService {
    submits: Mutex<HashMap<String, VecDeque<Result<JobId, SubmitError>>>>,
    polls: Mutex<HashMap<String, VecDeque<Result<JobStatus, PollError>>>>,
    poll_delays: HashMap<String, Duration>,
    poll_calls: Mutex<HashMap<String, usize>>,
    unhealthy: AtomicBool,
    health_delay: Duration,
    health_calls: AtomicUsize,
    health_in_flight: AtomicUsize,
    health_max_concurrent: AtomicUsize,
    personas: Option<Result<Vec<PersonaRef>, PollError>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submit(self, persona_id: &str, result: Result<JobId, SubmitError>) -> Self {
        self.submits
            .lock()
            .unwrap()
            .entry(persona_id.to_string())
            .or_default()
            .push_back(result);
        self
    }

    pub fn with_polls(self, job_id: &str, results: Vec<Result<JobStatus, PollError>>) -> Self {
        self.polls
            .lock()
            .unwrap()
            .entry(job_id.to_string())
            .or_default()
            .extend(results);
        self
    }

    pub fn with_poll_delay(mut self, job_id: &str, delay: Duration) -> Self {
        self.poll_delays.insert(job_id.to_string(), delay);
        self
    }

    pub fn with_health(self, healthy: bool) -> Self {
        self.unhealthy.store(!healthy, Ordering::SeqCst);
        self
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.unhealthy.store(!healthy, Ordering::SeqCst);
    }

    pub fn with_health_delay(mut self, delay: Duration) -> Self {
        self.health_delay = delay;
        self
    }

    pub fn with_personas(mut self, result: Result<Vec<PersonaRef>, PollError>) -> Self {
        self.personas = Some(result);
        self
    }

    pub fn poll_count(&self, job_id: &str) -> usize {
        self.poll_calls
            .lock()
            .unwrap()
            .get(job_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn health_max_concurrent(&self) -> usize {
        self.health_max_concurrent.load(Ordering::SeqCst)
    }
}

pub(crate) fn completed(text: &str) -> Result<JobStatus, PollError> {
    Ok(JobStatus::Completed(GenerationOutput::text(text)))
}

pub(crate) fn pending() -> Result<JobStatus, PollError> {
    Ok(JobStatus::Pending)
}

#[async_trait]
impl GenerationService for ScriptedService {
    async fn submit(&self, persona_id: &str, _prompt_text: &str) -> Result<JobId, SubmitError> {
        let scripted = self
            .submits
            .lock()
            .unwrap()
            .get_mut(persona_id)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| Ok(JobId::new(format!("job-{}", persona_id))))
    }

    async fn poll_status(&self, job_id: &JobId) -> Result<JobStatus, PollError> {
        *self
            .poll_calls
            .lock()
            .unwrap()
            .entry(job_id.to_string())
            .or_default() += 1;

        if let Some(delay) = self.poll_delays.get(job_id.as_str()) {
            tokio::time::sleep(*delay).await;
        }

        let scripted = self
            .polls
            .lock()
            .unwrap()
            .get_mut(job_id.as_str())
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or(Ok(JobStatus::Pending))
    }

    async fn check_health(&self) -> bool {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.health_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.health_max_concurrent.fetch_max(now, Ordering::SeqCst);

        if !self.health_delay.is_zero() {
            tokio::time::sleep(self.health_delay).await;
        }

        self.health_in_flight.fetch_sub(1, Ordering::SeqCst);
        !self.unhealthy.load(Ordering::SeqCst)
    }

    async fn fetch_personas(&self) -> Result<Vec<PersonaRef>, PollError> {
        self.personas
            .clone()
            .unwrap_or_else(|| Err(PollError::Transport("no personas scripted".to_string())))
    }

    async fn fetch_history(&self, query: &HistoryQuery) -> Result<HistoryPage, PollError> {
        Ok(HistoryPage {
            items: Vec::new(),
            total: 0,
            page: query.page,
            per_page: query.per_page,
        })
    }
}
