//! Availability monitor.
//!
//! Periodically probes the generation service and publishes the result as
//! an [`AvailabilitySignal`]. The monitor is the only writer of the
//! signal; readers hold a `watch::Receiver` and read it synchronously.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use twins_core::availability::AvailabilitySignal;
use twins_core::service::GenerationService;

const MIN_PROBE_INTERVAL: Duration = Duration::from_millis(1);

/// Result of a single [`AvailabilityMonitor::probe`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Checked(AvailabilitySignal),
    /// Another probe was still in flight.
    Skipped,
}

struct MonitorInner {
    service: Arc<dyn GenerationService>,
    signal: watch::Sender<AvailabilitySignal>,
    in_flight: AtomicBool,
    interval: Duration,
}

/// Clears the in-flight flag when the probe finishes or is dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct AvailabilityMonitor {
    inner: Arc<MonitorInner>,
}

impl AvailabilityMonitor {
    /// A zero `interval` is raised to 1 ms.
    pub fn new(service: Arc<dyn GenerationService>, interval: Duration) -> Self {
        let (signal, _) = watch::channel(AvailabilitySignal::Unknown);
        Self {
            inner: Arc::new(MonitorInner {
                service,
                signal,
                in_flight: AtomicBool::new(false),
                interval: interval.max(MIN_PROBE_INTERVAL),
            }),
        }
    }

    /// Current signal.
    pub fn signal(&self) -> AvailabilitySignal {
        *self.inner.signal.borrow()
    }

    /// Returns a receiver that observes every signal change.
    pub fn subscribe(&self) -> watch::Receiver<AvailabilitySignal> {
        self.inner.signal.subscribe()
    }

    /// Runs one health check unless one is already in flight.
    pub async fn probe(&self) -> ProbeOutcome {
        if self
            .inner
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("health check still in flight, skipping probe");
            return ProbeOutcome::Skipped;
        }
        let _guard = InFlightGuard(&self.inner.in_flight);

        let signal = AvailabilitySignal::from_health(self.inner.service.check_health().await);
        let previous = self.inner.signal.send_replace(signal);
        if previous != signal {
            match signal {
                AvailabilitySignal::Unavailable => {
                    tracing::warn!(%previous, "generation service became unavailable")
                }
                _ => tracing::info!(%previous, current = %signal, "availability changed"),
            }
        }
        ProbeOutcome::Checked(signal)
    }

    /// Starts the periodic probe loop.
    ///
    /// The first probe fires immediately. Each tick launches its probe
    /// without waiting on the previous one; a tick whose predecessor has
    /// not resolved is skipped by [`probe`](Self::probe). The loop exits
    /// when `cancel` fires.
    pub fn spawn(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let monitor = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(monitor.inner.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let probe = monitor.clone();
                        tokio::spawn(async move {
                            probe.probe().await;
                        });
                    }
                }
            }
            tracing::debug!("availability monitor stopped");
        })
    }
}
