//! Reachability probes
//!
//! The monitor engine only needs "send one probe, get success or failure
//! within a bounded time". [`Prober`] is that capability; this module ships
//! two implementations:
//!
//! - [`SystemPingProber`] runs the platform `ping` binary once per probe
//! - [`TcpProber`] opens a TCP connection to a fixed port

mod ping;
mod port_check;

use std::time::Duration;

use async_trait::async_trait;

pub use ping::{PROBE_GRACE, SystemPingProber, ping_command_args};
pub use port_check::{PortCheckError, check_port_async};

/// Default time budget for a single probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Sends one reachability probe to a host
///
/// Implementations never report errors: timeouts, spawn failures and any
/// other fault count as an unreachable host. A call must finish within
/// `timeout` plus a small bounded grace period.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probes `host` once, returning `true` if it answered in time
    async fn probe(&self, host: &str, timeout: Duration) -> bool;
}

/// Probes a host by connecting to a TCP port
///
/// Useful for hosts that filter ICMP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpProber {
    port: u16,
}

impl TcpProber {
    /// Creates a prober that connects to `port`
    #[must_use]
    pub const fn new(port: u16) -> Self {
        Self { port }
    }

    /// The probed port
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(80)
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, host: &str, timeout: Duration) -> bool {
        match check_port_async(host, self.port, timeout).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(host, port = self.port, error = %e, "TCP probe failed");
                false
            }
        }
    }
}
