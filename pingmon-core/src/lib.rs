//! `PingMon` Core Library
//!
//! Reachability monitoring for a single host: validate the target, probe it
//! on a fixed interval, keep per-run statistics and report status transitions
//! to an observer.
//!
//! # Crate Structure
//!
//! - [`validation`] - Host name and IPv4 address validation
//! - [`probe`] - The [`Prober`] capability with ping and TCP implementations
//! - [`stats`] - Per-run counters and timestamps
//! - [`engine`] - Run lifecycle, probe loop and event delivery
//! - [`clock`] - Timestamp sources (system and manual)
//! - [`settings`] - TOML-backed monitor settings
//! - [`tracing`] - Structured logging setup

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod clock;
pub mod engine;
pub mod probe;
pub mod settings;
pub mod stats;
pub mod tracing;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{
    DEFAULT_STOP_TIMEOUT, EventReceiver, EventSender, MonitorEngine, MonitorError, MonitorEvent,
    RunRequest, StartError, StopOutcome, event_channel,
};
pub use probe::{
    DEFAULT_PROBE_TIMEOUT, PortCheckError, Prober, SystemPingProber, TcpProber, check_port_async,
};
pub use settings::{MonitorSettings, ProbeKind, SettingsError, SettingsResult};
pub use stats::{RunStatus, Statistics};
pub use tracing::{TracingConfig, TracingError, TracingLevel, TracingOutput, init_tracing};
pub use validation::{HostError, MAX_HOST_LEN, is_valid_host, validate_host};
