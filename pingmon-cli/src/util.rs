//! Shared utility functions used across command modules.

use std::path::{Path, PathBuf};

use pingmon_core::probe::PROBE_GRACE;
use pingmon_core::tracing::span_names;
use pingmon_core::{MonitorSettings, ProbeKind, SystemPingProber, TracingConfig, TracingLevel};

use crate::error::CliError;

pub const GREEN: &str = "\x1b[32m";
pub const RED: &str = "\x1b[31m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";
pub const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Output options shared by every command
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub quiet: bool,
    pub color: bool,
}

impl Output {
    /// Wraps `text` in an ANSI style when color is enabled
    pub fn paint(self, style: &str, text: &str) -> String {
        if self.color {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// Default settings location: `<config dir>/pingmon/config.toml`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pingmon").join("config.toml"))
}

/// Loads settings from the explicit path, or the default location if it
/// exists, or falls back to built-in defaults
pub fn load_settings(config_path: Option<&Path>) -> Result<MonitorSettings, CliError> {
    let _span = pingmon_core::trace_operation!(span_names::SETTINGS_LOAD).entered();

    if let Some(path) = config_path {
        return Ok(MonitorSettings::load(path)?);
    }

    match default_settings_path() {
        Some(path) if path.is_file() => Ok(MonitorSettings::load(&path)?),
        _ => {
            tracing::debug!("No settings file found, using defaults");
            Ok(MonitorSettings::default())
        }
    }
}

/// Refuses to run ping probes when no `ping` binary is installed
pub fn ensure_probe_available(settings: &MonitorSettings) -> Result<(), CliError> {
    if settings.probe == ProbeKind::Ping && !SystemPingProber::new().is_available() {
        return Err(CliError::Config(
            "ping command not found in PATH; install it or use --probe tcp".to_string(),
        ));
    }
    Ok(())
}

/// Command-line values that take precedence over the settings file
#[derive(Debug, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub interval_secs: Option<u64>,
    pub probe_timeout_ms: Option<u64>,
    pub probe: Option<ProbeKind>,
    pub tcp_port: Option<u16>,
}

impl Overrides {
    /// Applies the overrides on top of `settings`
    pub fn apply(self, settings: &mut MonitorSettings) {
        if let Some(host) = self.host {
            settings.host = host;
        }
        if let Some(interval) = self.interval_secs {
            settings.interval_secs = interval;
        }
        if let Some(timeout) = self.probe_timeout_ms {
            settings.probe_timeout_ms = timeout;
            // A probe may run for its timeout plus the grace period
            let worst_case = timeout.saturating_add(PROBE_GRACE.as_millis() as u64);
            settings.stop_timeout_ms = settings.stop_timeout_ms.max(worst_case);
        }
        if let Some(probe) = self.probe {
            settings.probe = probe;
        }
        if let Some(port) = self.tcp_port {
            settings.tcp_port = port;
        }
    }
}

/// Logging options taken from the command line
#[derive(Debug, Default)]
pub struct LogOptions {
    pub verbose: u8,
    pub quiet: bool,
    pub log_file: Option<PathBuf>,
    pub color: bool,
}

/// Builds the subscriber config from the flags and the settings file
///
/// `-q` forces errors only, otherwise the configured level is raised by each
/// `-v`. `--log-file` wins over `log_file` in the settings. A settings file
/// that fails to load is reported later by the command itself.
pub fn tracing_config(config_path: Option<&Path>, options: LogOptions) -> TracingConfig {
    let settings = load_settings(config_path).ok();

    let level = if options.quiet {
        TracingLevel::Error
    } else {
        settings
            .as_ref()
            .and_then(|s| s.tracing_level().ok())
            .unwrap_or_default()
            .raised_by(options.verbose)
    };
    let log_file = options
        .log_file
        .or_else(|| settings.and_then(|s| s.log_file));

    TracingConfig::new()
        .with_level(level)
        .with_log_file(log_file)
        .with_ansi(options.color)
}

/// Local wall-clock timestamp for event lines
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
