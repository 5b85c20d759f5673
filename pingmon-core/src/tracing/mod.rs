//! Tracing integration for structured logging
//!
//! The library only emits `tracing` events and spans; it never installs a
//! subscriber on its own. Binaries call [`init_tracing`] once at startup.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// A global subscriber is already installed or the filter is invalid
    #[error("Failed to initialize tracing: {0}")]
    InitializationFailed(String),

    /// The log file could not be opened for appending
    #[error("Failed to open log file {path}: {reason}")]
    LogFile {
        /// Path of the log file
        path: String,
        /// Underlying I/O error
        reason: String,
    },
}

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum TracingLevel {
    /// Errors only
    Error,
    /// Errors and warnings (unreachable host, aborted stop)
    Warn,
    /// Run lifecycle (default)
    #[default]
    Info,
    /// Per-tick details
    Debug,
    /// Everything
    Trace,
}

impl TracingLevel {
    const ORDERED: [Self; 5] = [
        Self::Error,
        Self::Warn,
        Self::Info,
        Self::Debug,
        Self::Trace,
    ];

    /// Raises the level by one step per `-v`, saturating at `Trace`
    #[must_use]
    pub fn raised_by(self, verbosity: u8) -> Self {
        let index = Self::ORDERED.iter().position(|l| *l == self).unwrap_or(2);
        let raised = (index + usize::from(verbosity)).min(Self::ORDERED.len() - 1);
        Self::ORDERED[raised]
    }
}

impl std::str::FromStr for TracingLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TracingOutput {
    /// Standard error only
    #[default]
    Stderr,
    /// Standard error plus an append-only file (no rotation)
    File {
        /// Path of the log file
        path: PathBuf,
    },
}

/// Subscriber settings for [`init_tracing`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Verbosity for `pingmon` targets
    pub level: TracingLevel,
    /// Destination
    pub output: TracingOutput,
    /// Color escapes on the console
    pub ansi: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: TracingLevel::Info,
            output: TracingOutput::Stderr,
            ansi: true,
        }
    }
}

impl TracingConfig {
    /// Creates a config that logs `info` to stderr
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log level
    #[must_use]
    pub const fn with_level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }

    /// Also appends log lines to `path` when given
    #[must_use]
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.output = path.map_or(TracingOutput::Stderr, |path| TracingOutput::File { path });
        self
    }

    /// Enables or disables console colors
    #[must_use]
    pub const fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Filter directive covering the library and the binary
    #[must_use]
    pub fn directive(&self) -> String {
        format!("pingmon_core={level},pingmon={level}", level = self.level)
    }
}

/// Installs the global subscriber
///
/// # Errors
///
/// Returns [`TracingError::LogFile`] if the log file cannot be opened and
/// [`TracingError::InitializationFailed`] if a subscriber is already set.
pub fn init_tracing(config: &TracingConfig) -> Result<(), TracingError> {
    let filter = EnvFilter::try_new(config.directive())
        .map_err(|e| TracingError::InitializationFailed(e.to_string()))?;

    let console = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(config.ansi)
        .with_writer(std::io::stderr);

    let file = match &config.output {
        TracingOutput::Stderr => None,
        TracingOutput::File { path } => Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| TracingError::InitializationFailed(e.to_string()))?;

    tracing::debug!(level = %config.level, output = ?config.output, "Tracing initialized");
    Ok(())
}

fn open_log_file(path: &Path) -> Result<std::fs::File, TracingError> {
    let log_error = |e: std::io::Error| TracingError::LogFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(log_error)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(log_error)
}

/// Creates an `info` span for a named operation
///
/// ```ignore
/// let span = pingmon_core::trace_operation!("monitor.run", host = %host);
/// ```
#[macro_export]
macro_rules! trace_operation {
    ($name:expr) => {
        tracing::info_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

/// Span names used across `PingMon`
pub mod span_names {
    /// One monitoring run, from start to stop
    pub const MONITOR_RUN: &str = "monitor.run";
    /// A single ad-hoc probe
    pub const PROBE_ONCE: &str = "probe.once";
    /// Settings load
    pub const SETTINGS_LOAD: &str = "settings.load";
}
