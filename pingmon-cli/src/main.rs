//! `PingMon` CLI - Command-line host reachability monitor
//!
//! Provides commands for continuous monitoring, one-off probes, host
//! validation, shell completions and man page generation.

mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;
use cli::Cli;
use pingmon_core::{TracingError, init_tracing};

use crate::util::{LogOptions, Output, tracing_config};

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    let color = !cli.no_color;

    let tracing = tracing_config(
        config_path,
        LogOptions {
            verbose: cli.verbose,
            quiet: cli.quiet,
            log_file: cli.log_file.clone(),
            color,
        },
    );
    if let Err(e) = init_tracing(&tracing) {
        eprintln!("Warning: {e}");
        if matches!(e, TracingError::LogFile { .. }) {
            let _ = init_tracing(&tracing.with_log_file(None));
        }
    }

    let out = Output {
        quiet: cli.quiet,
        color,
    };

    let result = commands::dispatch(config_path, cli.command, out);

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
