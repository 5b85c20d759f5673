//! TCP port reachability check
//!
//! Resolves the host and tries each address in turn. The whole check,
//! resolution included, shares one deadline so a probe never outlives its
//! budget.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, timeout_at};

/// Error type for port check operations
#[derive(Debug, Error)]
pub enum PortCheckError {
    /// Host resolution failed
    #[error("Failed to resolve host '{host}': {reason}")]
    ResolutionFailed {
        /// The hostname that failed to resolve
        host: String,
        /// The reason for the failure
        reason: String,
    },
    /// Connection refused or timed out
    #[error("Port {port} on '{host}' is not reachable: {reason}")]
    Unreachable {
        /// The hostname that was unreachable
        host: String,
        /// The port that was unreachable
        port: u16,
        /// The reason for the failure
        reason: String,
    },
}

/// Checks if a TCP port is reachable on the given host within `timeout`
///
/// # Errors
/// * `PortCheckError::ResolutionFailed` if the hostname cannot be resolved
/// * `PortCheckError::Unreachable` if no address accepted a connection before
///   the deadline
pub async fn check_port_async(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<(), PortCheckError> {
    let deadline = Instant::now() + timeout;

    let addrs: Vec<SocketAddr> = match timeout_at(deadline, tokio::net::lookup_host((host, port)))
        .await
    {
        Ok(Ok(addrs)) => addrs.collect(),
        Ok(Err(e)) => {
            return Err(PortCheckError::ResolutionFailed {
                host: host.to_string(),
                reason: e.to_string(),
            });
        }
        Err(_) => {
            return Err(PortCheckError::ResolutionFailed {
                host: host.to_string(),
                reason: "Resolution timed out".to_string(),
            });
        }
    };

    if addrs.is_empty() {
        return Err(PortCheckError::ResolutionFailed {
            host: host.to_string(),
            reason: "No addresses found".to_string(),
        });
    }

    let mut last_error = String::new();
    for addr in addrs {
        match timeout_at(deadline, tokio::net::TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => return Ok(()),
            Ok(Err(e)) => last_error = e.to_string(),
            Err(_) => {
                last_error = "Connection timed out".to_string();
                break;
            }
        }
    }

    Err(PortCheckError::Unreachable {
        host: host.to_string(),
        port,
        reason: last_error,
    })
}
