//! Command handler modules for the CLI.

mod check;
mod completions;
mod manpage;
mod monitor;
mod validate;

use std::path::Path;

use crate::cli::Commands;
use crate::error::CliError;
use crate::util::{Output, Overrides};

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(
    config_path: Option<&Path>,
    command: Commands,
    out: Output,
) -> Result<(), CliError> {
    match command {
        Commands::Monitor {
            host,
            interval,
            count,
            probe,
            port,
            json,
        } => monitor::cmd_monitor(
            config_path,
            monitor::MonitorParams {
                overrides: Overrides {
                    host,
                    interval_secs: interval,
                    probe_timeout_ms: None,
                    probe: probe.map(Into::into),
                    tcp_port: port,
                },
                count,
                json,
            },
            out,
        ),
        Commands::Check {
            host,
            timeout,
            probe,
            port,
        } => check::cmd_check(
            config_path,
            Overrides {
                host: Some(host),
                interval_secs: None,
                probe_timeout_ms: timeout,
                probe: probe.map(Into::into),
                tcp_port: port,
            },
            out,
        ),
        Commands::Validate { host } => validate::cmd_validate(&host, out),
        Commands::Completions { shell } => completions::cmd_completions(shell),
        Commands::Manpage => manpage::cmd_manpage(),
    }
}
