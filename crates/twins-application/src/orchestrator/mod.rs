//! Job orchestrator.
//!
//! Owns every generation run and the per-persona job handles inside them.
//! Network calls and reveal ticks run as independent tasks which report
//! back over a channel; only the orchestrator mutates handles, so results
//! arriving in any order are applied one at a time.
//!
//! # Lifecycle
//!
//! 1. [`JobOrchestrator::start_run`] creates one handle per persona,
//!    supersedes older handles of the same personas and spawns submissions.
//! 2. [`JobOrchestrator::step`] applies one task result or poll tick.
//!    The poll timer only exists while some handle is `Polling`.
//! 3. Terminal handles leave the active set but stay in their run until
//!    [`JobOrchestrator::dismiss_run`].

mod event;
mod fallback;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use twins_core::availability::AvailabilitySignal;
use twins_core::config::OrchestratorConfig;
use twins_core::error::{PollTimeout, Result, TwinsError};
use twins_core::history::HistoryEntry;
use twins_core::job::{GenerationRun, JobHandle, JobStatus};
use twins_core::persona::PersonaRef;
use twins_core::service::GenerationService;
use uuid::Uuid;

pub use event::JobUpdate;
use event::{JobEvent, JobEventKind, JobKey};
use fallback::{SUPERSEDED_MESSAGE, fallback_text};

use crate::history_cache::SessionHistoryCache;
use crate::presenter::StreamingPresenter;

const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Result of [`JobOrchestrator::start_run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStarted {
    pub run_id: Uuid,
    /// The service was reported unavailable; expect fallback results.
    pub fallback_likely: bool,
}

/// Bookkeeping for a handle that has not reached a terminal state.
struct ActiveJob {
    key: JobKey,
    cancel: CancellationToken,
    /// Set while the handle is `Polling`.
    polling_since: Option<Instant>,
    poll_in_flight: bool,
}

pub struct JobOrchestrator {
    service: Arc<dyn GenerationService>,
    presenter: StreamingPresenter,
    availability: watch::Receiver<AvailabilitySignal>,
    history: Option<Arc<SessionHistoryCache>>,
    poll_interval: Duration,
    poll_timeout: Duration,
    max_personas_per_run: Option<usize>,
    runs: Vec<GenerationRun>,
    /// Keyed by persona id; at most one active handle per persona.
    active: HashMap<String, ActiveJob>,
    next_epoch: u64,
    events_tx: mpsc::UnboundedSender<JobEvent>,
    events_rx: mpsc::UnboundedReceiver<JobEvent>,
    updates: broadcast::Sender<JobUpdate>,
    poll_timer: Option<Interval>,
    shutdown: CancellationToken,
}

impl JobOrchestrator {
    pub fn new(
        service: Arc<dyn GenerationService>,
        availability: watch::Receiver<AvailabilitySignal>,
        config: &OrchestratorConfig,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            service,
            presenter: StreamingPresenter::from_config(config),
            availability,
            history: None,
            poll_interval: config.poll_interval(),
            poll_timeout: config.poll_timeout(),
            max_personas_per_run: config.max_personas_per_run,
            runs: Vec::new(),
            active: HashMap::new(),
            next_epoch: 0,
            events_tx,
            events_rx,
            updates,
            poll_timer: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Records a history entry for every run started from now on.
    pub fn with_history(mut self, history: Arc<SessionHistoryCache>) -> Self {
        self.history = Some(history);
        self
    }

    /// Subscribes to handle updates.
    pub fn subscribe(&self) -> broadcast::Receiver<JobUpdate> {
        self.updates.subscribe()
    }

    pub fn runs(&self) -> &[GenerationRun] {
        &self.runs
    }

    pub fn run(&self, run_id: Uuid) -> Option<&GenerationRun> {
        self.runs.iter().find(|r| r.id() == run_id)
    }

    /// Most recent handle for `persona_id` across all retained runs.
    pub fn handle(&self, persona_id: &str) -> Option<&JobHandle> {
        self.runs.iter().rev().find_map(|r| r.job(persona_id))
    }

    /// True while any handle is not yet terminal.
    pub fn has_pending_work(&self) -> bool {
        !self.active.is_empty()
    }

    /// True while the poll loop is scheduled.
    pub fn is_polling(&self) -> bool {
        self.poll_timer.is_some()
    }

    /// Starts a run: one job per persona, all sharing `prompt_text`.
    ///
    /// Never blocks on availability: when the service is known to be down
    /// the run still starts and [`RunStarted::fallback_likely`] is set.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty or duplicate selection, a
    /// blank prompt, or more personas than `max_personas_per_run`.
    pub async fn start_run(
        &mut self,
        personas: Vec<PersonaRef>,
        prompt_text: impl Into<String>,
    ) -> Result<RunStarted> {
        if let Some(max) = self.max_personas_per_run
            && personas.len() > max
        {
            return Err(TwinsError::validation(format!(
                "at most {} persona(s) per run, got {}",
                max,
                personas.len()
            )));
        }

        let fallback_likely = self.availability.borrow().is_unavailable();
        if fallback_likely {
            tracing::warn!("generation service unavailable, results will likely fall back");
        }

        let mut epoch = self.next_epoch;
        let run = GenerationRun::new(prompt_text, personas, |_| {
            epoch += 1;
            epoch
        })?;
        self.next_epoch = epoch;
        let run_id = run.id();

        for handle in run.jobs() {
            self.supersede(handle.persona_id());
        }

        if let Some(history) = &self.history {
            history.record(HistoryEntry::from(&run)).await;
        }

        let prompt = run.prompt_text().to_string();
        let keys: Vec<JobKey> = run
            .jobs()
            .iter()
            .map(|h| JobKey {
                run_id,
                persona_id: h.persona_id().to_string(),
                epoch: h.epoch(),
            })
            .collect();
        let initial: Vec<JobUpdate> = run
            .jobs()
            .iter()
            .map(|h| JobUpdate::from_handle(run_id, h))
            .collect();
        self.runs.push(run);

        tracing::info!(%run_id, personas = keys.len(), "generation run started");
        for key in keys {
            self.activate_and_submit(key, prompt.clone());
        }
        for update in initial {
            self.publish(update);
        }

        Ok(RunStarted {
            run_id,
            fallback_likely,
        })
    }

    /// Restarts `persona_id` in the latest run that contains it.
    ///
    /// The previous handle for the persona is superseded.
    pub fn regenerate(&mut self, persona_id: &str) -> Result<()> {
        let run_index = self
            .runs
            .iter()
            .rposition(|r| r.job(persona_id).is_some())
            .ok_or_else(|| TwinsError::not_found("job", persona_id))?;

        self.supersede(persona_id);
        self.next_epoch += 1;
        let epoch = self.next_epoch;

        let run = &mut self.runs[run_index];
        let run_id = run.id();
        let prompt = run.prompt_text().to_string();
        let update = run
            .restart_job(persona_id, epoch)
            .map(|h| JobUpdate::from_handle(run_id, h));

        tracing::info!(%run_id, persona_id, "regenerating job");
        self.activate_and_submit(
            JobKey {
                run_id,
                persona_id: persona_id.to_string(),
                epoch,
            },
            prompt,
        );
        if let Some(update) = update {
            self.publish(update);
        }
        Ok(())
    }

    /// Drops a run, cancelling whatever it still has in flight.
    pub fn dismiss_run(&mut self, run_id: Uuid) -> bool {
        let Some(index) = self.runs.iter().position(|r| r.id() == run_id) else {
            return false;
        };
        self.active.retain(|_, job| {
            if job.key.run_id == run_id {
                job.cancel.cancel();
                false
            } else {
                true
            }
        });
        self.runs.remove(index);
        tracing::debug!(%run_id, "run dismissed");
        true
    }

    /// Applies the next task result or poll tick.
    ///
    /// Returns `false` without waiting when nothing is pending.
    pub async fn step(&mut self) -> bool {
        if self.active.is_empty() {
            self.stop_poll_loop();
            return false;
        }

        if self.active.values().any(|job| job.polling_since.is_some()) {
            self.ensure_poll_loop();
        } else {
            self.stop_poll_loop();
        }

        tokio::select! {
            Some(event) = self.events_rx.recv() => self.apply_event(event),
            _ = next_tick(self.poll_timer.as_mut()) => self.poll_tick(),
        }

        !self.active.is_empty()
    }

    /// Drives the orchestrator until every handle is terminal.
    pub async fn run_until_settled(&mut self) {
        while self.step().await {}
        self.stop_poll_loop();
    }

    fn ensure_poll_loop(&mut self) {
        if self.poll_timer.is_none() {
            let mut timer =
                tokio::time::interval_at(Instant::now() + self.poll_interval, self.poll_interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.poll_timer = Some(timer);
            tracing::debug!("poll loop started");
        }
    }

    fn stop_poll_loop(&mut self) {
        if self.poll_timer.take().is_some() {
            tracing::debug!("poll loop stopped");
        }
    }

    fn publish(&self, update: JobUpdate) {
        // No subscribers is fine.
        let _ = self.updates.send(update);
    }

    fn find_handle<'a>(runs: &'a mut [GenerationRun], key: &JobKey) -> Option<&'a mut JobHandle> {
        runs.iter_mut()
            .find(|r| r.id() == key.run_id)?
            .job_mut(&key.persona_id)
            .filter(|h| h.epoch() == key.epoch)
    }

    /// Cancels the persona's active handle and marks it failed.
    fn supersede(&mut self, persona_id: &str) {
        let Some(previous) = self.active.remove(persona_id) else {
            return;
        };
        previous.cancel.cancel();

        let update = Self::find_handle(&mut self.runs, &previous.key).and_then(|handle| {
            handle.fail(SUPERSEDED_MESSAGE).ok()?;
            Some(JobUpdate::from_handle(previous.key.run_id, handle))
        });
        tracing::debug!(persona_id, epoch = previous.key.epoch, "job superseded");
        if let Some(update) = update {
            self.publish(update);
        }
    }

    fn retire(&mut self, persona_id: &str) {
        if let Some(job) = self.active.remove(persona_id) {
            job.cancel.cancel();
        }
    }

    fn activate_and_submit(&mut self, key: JobKey, prompt: String) {
        let cancel = self.shutdown.child_token();
        self.active.insert(
            key.persona_id.clone(),
            ActiveJob {
                key: key.clone(),
                cancel: cancel.clone(),
                polling_since: None,
                poll_in_flight: false,
            },
        );

        let service = self.service.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let persona_id = key.persona_id.clone();
            tokio::select! {
                _ = cancel.cancelled() => {}
                result = service.submit(&persona_id, &prompt) => {
                    let _ = tx.send(JobEvent { key, kind: JobEventKind::Submitted(result) });
                }
            }
        });
    }

    fn spawn_reveal(&self, key: JobKey, text: String) {
        let Some(job) = self.active.get(&key.persona_id) else {
            return;
        };
        let cancel = job.cancel.clone();
        let presenter = self.presenter.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            presenter
                .reveal(&text, &cancel, |partial, done| {
                    let _ = tx.send(JobEvent {
                        key: key.clone(),
                        kind: JobEventKind::Revealed {
                            partial: partial.to_string(),
                            done,
                        },
                    });
                })
                .await;
        });
    }

    fn poll_tick(&mut self) {
        let now = Instant::now();
        let mut timed_out = Vec::new();
        let mut due = Vec::new();

        for job in self.active.values_mut() {
            let Some(since) = job.polling_since else {
                continue;
            };
            if now.duration_since(since) >= self.poll_timeout {
                timed_out.push(job.key.clone());
            } else if job.poll_in_flight {
                tracing::debug!(persona_id = %job.key.persona_id, "previous poll still in flight");
            } else {
                job.poll_in_flight = true;
                due.push((job.key.clone(), job.cancel.clone()));
            }
        }

        for (key, cancel) in due {
            let job_id = self
                .runs
                .iter()
                .find(|r| r.id() == key.run_id)
                .and_then(|r| r.job(&key.persona_id))
                .and_then(|h| h.job_id().cloned());
            let Some(job_id) = job_id else {
                continue;
            };

            let service = self.service.clone();
            let tx = self.events_tx.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    result = service.poll_status(&job_id) => {
                        let _ = tx.send(JobEvent { key, kind: JobEventKind::Polled(result) });
                    }
                }
            });
        }

        for key in timed_out {
            let message = PollTimeout {
                elapsed: self.poll_timeout,
            }
            .to_string();
            let update = Self::find_handle(&mut self.runs, &key).and_then(|handle| {
                handle.fail(message.as_str()).ok()?;
                Some(JobUpdate::from_handle(key.run_id, handle))
            });
            tracing::warn!(persona_id = %key.persona_id, "job timed out");
            self.retire(&key.persona_id);
            if let Some(update) = update {
                self.publish(update);
            }
        }
    }

    fn apply_event(&mut self, event: JobEvent) {
        let JobEvent { key, kind } = event;
        let is_current = self
            .active
            .get(&key.persona_id)
            .is_some_and(|job| job.key == key);
        if !is_current {
            tracing::debug!(
                persona_id = %key.persona_id,
                epoch = key.epoch,
                "discarding stale job event"
            );
            return;
        }

        let Some(handle) = Self::find_handle(&mut self.runs, &key) else {
            self.retire(&key.persona_id);
            return;
        };

        let was_poll = matches!(kind, JobEventKind::Polled(_));
        let mut changed = true;
        let mut started_polling = false;
        let mut reveal_text = None;

        let applied = match kind {
            JobEventKind::Submitted(Ok(job_id)) => {
                started_polling = true;
                handle.mark_submitted(job_id)
            }
            JobEventKind::Submitted(Err(e)) => {
                tracing::warn!(persona_id = %key.persona_id, error = %e, "submission failed, using fallback");
                let text = fallback_text(handle.display_name());
                handle.complete_with_fallback(text)
            }
            JobEventKind::Polled(Ok(JobStatus::Pending)) => {
                changed = false;
                Ok(())
            }
            JobEventKind::Polled(Ok(JobStatus::Completed(output))) => {
                reveal_text = Some(output.hot_take);
                handle.begin_reveal(output.media)
            }
            JobEventKind::Polled(Ok(JobStatus::Failed(reason))) => {
                handle.fail(format!("Generation failed: {}", reason))
            }
            JobEventKind::Polled(Err(e)) => handle.fail(e.to_string()),
            JobEventKind::Revealed { partial, done } => {
                if done {
                    handle.finish_reveal(&partial)
                } else {
                    changed = handle.apply_reveal(&partial);
                    Ok(())
                }
            }
        };
        if let Err(e) = applied {
            tracing::error!(persona_id = %key.persona_id, error = %e, "rejected job transition");
            changed = false;
        }

        let terminal = handle.is_terminal();
        let update = changed.then(|| JobUpdate::from_handle(key.run_id, handle));
        if terminal {
            tracing::info!(
                persona_id = %key.persona_id,
                state = %handle.state(),
                "job finished"
            );
        }

        if let Some(job) = self.active.get_mut(&key.persona_id) {
            if was_poll {
                job.poll_in_flight = false;
            }
            if started_polling {
                job.polling_since = Some(Instant::now());
            }
            if reveal_text.is_some() {
                job.polling_since = None;
            }
        }

        if terminal {
            self.retire(&key.persona_id);
        } else if let Some(text) = reveal_text {
            self.spawn_reveal(key, text);
        }
        if let Some(update) = update {
            self.publish(update);
        }
    }
}

impl Drop for JobOrchestrator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn next_tick(timer: Option<&mut Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}
