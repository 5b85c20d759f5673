//! Monitor settings stored as TOML
//!
//! Every field has a serde default, so a partial (or empty) file is valid.
//! Command-line flags are applied on top of the loaded values by the caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{RunRequest, StartError};
use crate::probe::{PROBE_GRACE, Prober, SystemPingProber, TcpProber};
use crate::tracing::TracingLevel;

/// Errors that can occur while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read
    #[error("Failed to read settings file {path}: {reason}")]
    Io {
        /// Path of the file
        path: String,
        /// Underlying I/O error
        reason: String,
    },

    /// The TOML could not be parsed
    #[error("Failed to parse settings: {0}")]
    Parse(String),

    /// The settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    Serialize(String),

    /// Host or interval would be rejected by the engine
    #[error(transparent)]
    InvalidRequest(#[from] StartError),

    /// Probe timeout is zero, or a probe plus its grace period could outlast
    /// the stop timeout
    #[error(
        "Probe timeout ({probe_ms} ms) must be at least 1 ms and, with the {grace_ms} ms grace \
         period, fit within the stop timeout ({stop_ms} ms)"
    )]
    InvalidTimeouts {
        /// Configured probe timeout
        probe_ms: u64,
        /// Configured stop timeout
        stop_ms: u64,
        /// Grace a probe may take beyond its timeout
        grace_ms: u64,
    },

    /// TCP probing needs a non-zero port
    #[error("TCP port must be between 1 and 65535")]
    InvalidPort,

    /// Unknown log level name
    #[error("Unknown log level '{0}'")]
    InvalidLogLevel(String),
}

/// Result type for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Probe mechanism used by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// One ICMP echo through the system `ping` binary
    #[default]
    Ping,
    /// A TCP connect to `tcp_port`
    Tcp,
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ping => write!(f, "ping"),
            Self::Tcp => write!(f, "tcp"),
        }
    }
}

/// Monitor settings (stored in `config.toml`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSettings {
    /// Host monitored when none is given on the command line
    #[serde(default = "default_host")]
    pub host: String,
    /// Seconds between probes (default: 2)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Time budget for one probe in milliseconds (default: 1000)
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// How long a stop waits for the loop in milliseconds (default: 2000)
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,
    /// Probe mechanism
    #[serde(default)]
    pub probe: ProbeKind,
    /// Port used by the TCP probe (default: 80)
    #[serde(default = "default_tcp_port")]
    pub tcp_port: u16,
    /// Log level name (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// File that log lines are also appended to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

fn default_host() -> String {
    "8.8.8.8".to_string()
}

const fn default_interval_secs() -> u64 {
    2
}

const fn default_probe_timeout_ms() -> u64 {
    1000
}

const fn default_stop_timeout_ms() -> u64 {
    2000
}

const fn default_tcp_port() -> u16 {
    80
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            interval_secs: default_interval_secs(),
            probe_timeout_ms: default_probe_timeout_ms(),
            stop_timeout_ms: default_stop_timeout_ms(),
            probe: ProbeKind::default(),
            tcp_port: default_tcp_port(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

impl MonitorSettings {
    /// Parses settings from TOML text
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] for malformed TOML or mistyped fields.
    pub fn from_toml_str(text: &str) -> SettingsResult<Self> {
        toml::from_str(text).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Serializes settings as TOML
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Serialize`] if serialization fails.
    pub fn to_toml_string(&self) -> SettingsResult<String> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Serialize(e.to_string()))
    }

    /// Reads and parses a settings file
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] if the file cannot be read, or
    /// [`SettingsError::Parse`] if its content is invalid.
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let settings = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "Settings loaded");
        Ok(settings)
    }

    /// Checks every value the engine would otherwise reject at run time
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> SettingsResult<()> {
        self.run_request()?;
        let worst_case_probe = self.effective_probe_timeout() + PROBE_GRACE;
        if self.probe_timeout_ms == 0 || worst_case_probe > self.effective_stop_timeout() {
            return Err(SettingsError::InvalidTimeouts {
                probe_ms: self.probe_timeout_ms,
                stop_ms: self.stop_timeout_ms,
                grace_ms: PROBE_GRACE.as_millis() as u64,
            });
        }
        if self.probe == ProbeKind::Tcp && self.tcp_port == 0 {
            return Err(SettingsError::InvalidPort);
        }
        self.tracing_level()?;
        Ok(())
    }

    /// Builds the run request for the configured host and interval
    ///
    /// # Errors
    ///
    /// Returns [`StartError::InvalidHost`] or [`StartError::InvalidInterval`].
    pub fn run_request(&self) -> Result<RunRequest, StartError> {
        RunRequest::new(&self.host, self.interval_secs)
    }

    /// Per-probe time budget
    #[must_use]
    pub const fn effective_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Bound on a graceful stop
    #[must_use]
    pub const fn effective_stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    /// Parsed log level
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidLogLevel`] for an unknown name.
    pub fn tracing_level(&self) -> SettingsResult<TracingLevel> {
        self.log_level
            .parse()
            .map_err(|()| SettingsError::InvalidLogLevel(self.log_level.clone()))
    }

    /// Creates the prober selected by `probe`
    #[must_use]
    pub fn build_prober(&self) -> Arc<dyn Prober> {
        match self.probe {
            ProbeKind::Ping => Arc::new(SystemPingProber::new()),
            ProbeKind::Tcp => Arc::new(TcpProber::new(self.tcp_port)),
        }
    }
}
