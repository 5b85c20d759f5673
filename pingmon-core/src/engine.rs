//! Monitor engine: run lifecycle and the probe loop
//!
//! [`MonitorEngine`] supervises at most one monitoring run. `start` validates
//! the request and spawns a tokio task that probes the host once per tick;
//! `stop` signals the task and waits for it within a bounded time.
//!
//! Observers receive [`MonitorEvent`]s in order over an unbounded channel.
//! Status changes are edge-triggered: `StatusChanged { is_up: false }` is
//! sent when a success streak breaks, `StatusChanged { is_up: true }` when
//! the first success follows a failure streak.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::clock::{Clock, SystemClock};
use crate::probe::{DEFAULT_PROBE_TIMEOUT, Prober};
use crate::stats::Statistics;
use crate::tracing::span_names;
use crate::validation::{HostError, validate_host};

/// Default bound on how long `stop` waits for the loop to exit
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Events delivered to the observer of a [`MonitorEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Aggregate health flipped (edge-triggered)
    StatusChanged {
        /// `true` when the host recovered, `false` when it became unreachable
        is_up: bool,
    },
    /// Snapshot taken after a tick finished its bookkeeping
    StatsUpdated(Statistics),
    /// Rejected start or a stop that exceeded its bound
    Error(String),
}

/// Sending half of the event channel handed to the engine
pub type EventSender = mpsc::UnboundedSender<MonitorEvent>;

/// Receiving half of the event channel held by the observer
pub type EventReceiver = mpsc::UnboundedReceiver<MonitorEvent>;

/// Creates an ordered, lossless event channel for a [`MonitorEngine`]
#[must_use]
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Reasons `start` refuses to begin a run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    /// The host is not a valid IPv4 address or domain name
    #[error("Invalid host: {0}")]
    InvalidHost(#[from] HostError),
    /// The interval is below one second
    #[error("Interval must be at least 1 second (got {0})")]
    InvalidInterval(u64),
    /// Another run is still active
    #[error("Monitoring is already running")]
    AlreadyRunning,
}

/// Non-fatal conditions reported while supervising a run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    /// The loop did not observe cancellation in time and was aborted
    #[error("Monitoring loop did not stop within {} ms and was aborted", timeout.as_millis())]
    GracefulStopTimeout {
        /// The bound that was exceeded
        timeout: Duration,
    },
}

/// What `stop` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The loop exited within the bound
    Stopped,
    /// The loop was aborted after the bound elapsed
    TimedOut,
    /// No run was active
    NotRunning,
}

/// A validated request to monitor one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    host: String,
    interval_secs: u64,
}

impl RunRequest {
    /// Validates host and interval
    ///
    /// # Errors
    ///
    /// Returns [`StartError::InvalidHost`] or [`StartError::InvalidInterval`].
    pub fn new(host: &str, interval_secs: u64) -> Result<Self, StartError> {
        validate_host(host)?;
        if interval_secs < 1 {
            return Err(StartError::InvalidInterval(interval_secs));
        }
        Ok(Self {
            host: host.to_string(),
            interval_secs,
        })
    }

    /// Host being monitored
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Seconds between ticks
    #[must_use]
    pub const fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    /// Tick interval as a duration
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

struct ActiveRun {
    request: RunRequest,
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Supervises a single host monitoring run
pub struct MonitorEngine {
    prober: Arc<dyn Prober>,
    clock: Arc<dyn Clock>,
    events: EventSender,
    probe_timeout: Duration,
    stop_timeout: Duration,
    stats: Arc<RwLock<Statistics>>,
    run: Option<ActiveRun>,
}

impl MonitorEngine {
    /// Creates an idle engine that probes with `prober` and reports to `events`
    #[must_use]
    pub fn new(prober: Arc<dyn Prober>, events: EventSender) -> Self {
        Self {
            prober,
            clock: Arc::new(SystemClock),
            events,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            stats: Arc::new(RwLock::new(Statistics::new())),
            run: None,
        }
    }

    /// Replaces the timestamp source
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the per-probe time budget
    #[must_use]
    pub const fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Sets how long `stop` waits for the loop before aborting it
    #[must_use]
    pub const fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// Starts monitoring `host` every `interval_secs` seconds
    ///
    /// Returns as soon as the loop is spawned; the first probe runs
    /// immediately on the loop task. Must be called from within a tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Returns [`StartError::InvalidHost`], [`StartError::InvalidInterval`] or
    /// [`StartError::AlreadyRunning`]. A rejected start leaves the current
    /// statistics untouched.
    pub fn start(&mut self, host: &str, interval_secs: u64) -> Result<(), StartError> {
        let request = match RunRequest::new(host, interval_secs) {
            Ok(request) => request,
            Err(e) => return Err(self.reject(e)),
        };

        self.reap_finished_run();
        if self.run.is_some() {
            return Err(self.reject(StartError::AlreadyRunning));
        }

        let mut stats = Statistics::new();
        stats.begin(self.clock.now());
        self.stats = Arc::new(RwLock::new(stats));

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let probe_loop = ProbeLoop {
            host: request.host().to_string(),
            interval: request.interval(),
            probe_timeout: self.probe_timeout,
            prober: Arc::clone(&self.prober),
            clock: Arc::clone(&self.clock),
            stats: Arc::clone(&self.stats),
            events: self.events.clone(),
            cancel_rx,
        };

        let span = crate::trace_operation!(
            span_names::MONITOR_RUN,
            host = %request.host(),
            interval_secs = request.interval_secs()
        );
        let task = tokio::spawn(probe_loop.run().instrument(span));

        tracing::info!(
            host = %request.host(),
            interval_secs = request.interval_secs(),
            "Monitoring started"
        );

        self.run = Some(ActiveRun {
            request,
            cancel_tx,
            task,
        });
        Ok(())
    }

    /// Stops the active run and waits for the loop to exit
    ///
    /// Waits at most the stop timeout. A loop that overruns it is aborted and
    /// reported as [`MonitorError::GracefulStopTimeout`] through logging and a
    /// [`MonitorEvent::Error`]; the engine is idle either way. Calling this
    /// with no active run does nothing.
    ///
    /// The run is marked stopped before waiting. If the returned future is
    /// dropped early, the loop has already been signalled and exits on its own
    /// once its current probe returns.
    pub async fn stop(&mut self) -> StopOutcome {
        let Some(mut run) = self.run.take() else {
            return StopOutcome::NotRunning;
        };

        let _ = run.cancel_tx.send(true);
        write_stats(&self.stats).finish(self.clock.now());

        let outcome = match tokio::time::timeout(self.stop_timeout, &mut run.task).await {
            Ok(Ok(())) => StopOutcome::Stopped,
            Ok(Err(e)) => {
                tracing::error!(host = %run.request.host(), error = %e, "Monitoring loop failed");
                self.emit(MonitorEvent::Error(format!("Monitoring loop failed: {e}")));
                StopOutcome::Stopped
            }
            Err(_) => {
                run.task.abort();
                let err = MonitorError::GracefulStopTimeout {
                    timeout: self.stop_timeout,
                };
                tracing::warn!(host = %run.request.host(), "{err}");
                self.emit(MonitorEvent::Error(err.to_string()));
                StopOutcome::TimedOut
            }
        };

        tracing::info!(host = %run.request.host(), ?outcome, "Monitoring stopped");
        outcome
    }

    /// Returns `true` while a run is active
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Host of the active run
    #[must_use]
    pub fn current_host(&self) -> Option<&str> {
        self.run.as_ref().map(|run| run.request.host())
    }

    /// Request of the active run
    #[must_use]
    pub fn current_request(&self) -> Option<&RunRequest> {
        self.run.as_ref().map(|run| &run.request)
    }

    /// Consistent snapshot of the current (or last) run's statistics
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        read_stats(&self.stats)
    }

    /// Uptime of the current (or last) run as `"{h}h {m}m"`
    #[must_use]
    pub fn uptime_string(&self) -> String {
        self.statistics().uptime_string(self.clock.now())
    }

    fn reject(&self, err: StartError) -> StartError {
        tracing::error!(error = %err, "Monitoring not started");
        self.emit(MonitorEvent::Error(err.to_string()));
        err
    }

    /// Clears a run whose loop ended without being stopped (e.g. a panicking
    /// prober), so a new run can begin
    fn reap_finished_run(&mut self) {
        if !self.run.as_ref().is_some_and(|run| run.task.is_finished()) {
            return;
        }
        if let Some(run) = self.run.take() {
            tracing::warn!(host = %run.request.host(), "Monitoring loop ended unexpectedly");
            write_stats(&self.stats).finish(self.clock.now());
        }
    }

    fn emit(&self, event: MonitorEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Event receiver dropped");
        }
    }
}

impl Drop for MonitorEngine {
    fn drop(&mut self) {
        if let Some(run) = self.run.take() {
            let _ = run.cancel_tx.send(true);
            run.task.abort();
        }
    }
}

impl std::fmt::Debug for MonitorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorEngine")
            .field("probe_timeout", &self.probe_timeout)
            .field("stop_timeout", &self.stop_timeout)
            .field("run", &self.current_request())
            .field("stats", &self.statistics())
            .finish_non_exhaustive()
    }
}

/// State owned by the spawned loop task
struct ProbeLoop {
    host: String,
    interval: Duration,
    probe_timeout: Duration,
    prober: Arc<dyn Prober>,
    clock: Arc<dyn Clock>,
    stats: Arc<RwLock<Statistics>>,
    events: EventSender,
    cancel_rx: watch::Receiver<bool>,
}

impl ProbeLoop {
    async fn run(mut self) {
        let mut consecutive_failures: u32 = 0;

        loop {
            if *self.cancel_rx.borrow() {
                break;
            }

            write_stats(&self.stats).record_attempt();
            let is_up = self.prober.probe(&self.host, self.probe_timeout).await;

            if is_up {
                if consecutive_failures > 0 {
                    tracing::info!(host = %self.host, "Connection to {} restored", self.host);
                    self.emit(MonitorEvent::StatusChanged { is_up: true });
                }
                consecutive_failures = 0;
            } else {
                consecutive_failures += 1;
                let now = self.clock.now();
                write_stats(&self.stats).record_failure(now);
                tracing::warn!(
                    host = %self.host,
                    attempt = consecutive_failures,
                    "Host {} is unreachable",
                    self.host
                );
                if consecutive_failures == 1 {
                    self.emit(MonitorEvent::StatusChanged { is_up: false });
                }
            }

            let snapshot = read_stats(&self.stats);
            tracing::debug!(
                total = snapshot.total_probes,
                failed = snapshot.failed_probes,
                is_up,
                "Tick complete"
            );
            self.emit(MonitorEvent::StatsUpdated(snapshot));

            tokio::select! {
                biased;
                // Err means the engine is gone; stop either way
                _ = self.cancel_rx.changed() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::debug!(host = %self.host, "Probe loop exited");
    }

    fn emit(&self, event: MonitorEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Event receiver dropped");
        }
    }
}

fn read_stats(stats: &RwLock<Statistics>) -> Statistics {
    stats.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn write_stats(stats: &RwLock<Statistics>) -> std::sync::RwLockWriteGuard<'_, Statistics> {
    stats.write().unwrap_or_else(PoisonError::into_inner)
}
