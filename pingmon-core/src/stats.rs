//! Per-run monitoring statistics

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle label of a monitoring run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// No run has been started yet
    #[default]
    NotStarted,
    /// A run is active
    Running,
    /// The last run was stopped
    Stopped,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "Not Running"),
            Self::Running => write!(f, "Running"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Counters and timestamps describing one monitoring run
///
/// `failed_probes <= total_probes` always holds. Timestamps are `None` until
/// the corresponding event happens in the current run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Statistics {
    /// Probe attempts, including the one in flight
    pub total_probes: u64,
    /// Probe attempts that failed
    pub failed_probes: u64,
    /// When the run started
    pub started_at: Option<DateTime<Utc>>,
    /// When the most recent probe failed
    pub last_failure_at: Option<DateTime<Utc>>,
    /// When the run was stopped
    pub stopped_at: Option<DateTime<Utc>>,
    /// Current lifecycle label
    pub status: RunStatus,
}

impl Statistics {
    /// Creates statistics in the pre-run state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores the pre-run state, discarding all history
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns `true` if this snapshot belongs to an active run
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }

    /// Number of successful probes
    #[must_use]
    pub const fn successful_probes(&self) -> u64 {
        self.total_probes.saturating_sub(self.failed_probes)
    }

    /// Percentage of successful probes (0.0 before the first probe)
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        self.successful_probes() as f64 / self.total_probes.max(1) as f64 * 100.0
    }

    /// Time elapsed since the run started
    ///
    /// Frozen at `stopped_at` once the run is stopped; zero before any run.
    #[must_use]
    pub fn uptime(&self, now: DateTime<Utc>) -> Duration {
        let Some(started) = self.started_at else {
            return Duration::zero();
        };
        let end = match (self.status, self.stopped_at) {
            (RunStatus::Stopped, Some(stopped)) => stopped,
            _ => now,
        };
        (end - started).max(Duration::zero())
    }

    /// Uptime rendered as `"{hours}h {minutes}m"`
    #[must_use]
    pub fn uptime_string(&self, now: DateTime<Utc>) -> String {
        let uptime = self.uptime(now);
        format!("{}h {}m", uptime.num_hours(), uptime.num_minutes() % 60)
    }

    pub(crate) fn begin(&mut self, now: DateTime<Utc>) {
        self.reset();
        self.started_at = Some(now);
        self.status = RunStatus::Running;
    }

    pub(crate) fn record_attempt(&mut self) {
        self.total_probes += 1;
    }

    pub(crate) fn record_failure(&mut self, now: DateTime<Utc>) {
        self.failed_probes = (self.failed_probes + 1).min(self.total_probes);
        self.last_failure_at = Some(now);
    }

    pub(crate) fn finish(&mut self, now: DateTime<Utc>) {
        if self.status == RunStatus::Running {
            self.stopped_at = Some(now);
        }
        self.status = RunStatus::Stopped;
    }
}
