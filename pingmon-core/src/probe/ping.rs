//! ICMP probing through the system `ping` binary

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::Prober;

/// Extra time granted to the `ping` process beyond the probe timeout
pub const PROBE_GRACE: Duration = Duration::from_millis(500);

/// Builds the `ping` arguments for a single echo request on this platform
///
/// Windows takes the reply timeout in milliseconds (`-n 1 -w <ms>`), macOS
/// takes `-W` in milliseconds, other Unix systems take `-W` in whole seconds.
#[must_use]
pub fn ping_command_args(host: &str, timeout: Duration) -> Vec<String> {
    let millis = timeout.as_millis().max(1).to_string();
    let mut args: Vec<String> = if cfg!(windows) {
        vec!["-n".into(), "1".into(), "-w".into(), millis]
    } else if cfg!(target_os = "macos") {
        vec!["-c".into(), "1".into(), "-W".into(), millis]
    } else {
        let secs = timeout.as_secs_f64().ceil().max(1.0) as u64;
        vec!["-c".into(), "1".into(), "-W".into(), secs.to_string()]
    };
    args.push(host.to_string());
    args
}

/// Probes hosts by spawning the platform `ping` command
#[derive(Debug, Clone)]
pub struct SystemPingProber {
    binary: PathBuf,
}

impl SystemPingProber {
    /// Creates a prober that runs `ping` from `PATH`
    #[must_use]
    pub fn new() -> Self {
        Self::with_binary("ping")
    }

    /// Creates a prober that runs a specific binary
    #[must_use]
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Returns `true` if the configured binary exists
    ///
    /// Bare names are looked up in `PATH`.
    #[must_use]
    pub fn is_available(&self) -> bool {
        if self.binary.components().count() > 1 {
            return self.binary.is_file();
        }
        let Some(path) = std::env::var_os("PATH") else {
            return false;
        };
        std::env::split_paths(&path).any(|dir| {
            let candidate = dir.join(&self.binary);
            candidate.is_file() || (cfg!(windows) && candidate.with_extension("exe").is_file())
        })
    }
}

impl Default for SystemPingProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prober for SystemPingProber {
    async fn probe(&self, host: &str, timeout: Duration) -> bool {
        let mut command = Command::new(&self.binary);
        command
            .args(ping_command_args(host, timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match tokio::time::timeout(timeout + PROBE_GRACE, command.status()).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                tracing::error!(host, error = %e, "Ping error");
                false
            }
            Err(_) => {
                tracing::debug!(host, "Ping process exceeded its time budget");
                false
            }
        }
    }
}
