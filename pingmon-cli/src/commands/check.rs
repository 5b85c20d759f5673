//! Single probe command.

use std::path::Path;
use std::time::Instant;

use pingmon_core::tracing::span_names;
use pingmon_core::validation::validate_host;
use tracing::Instrument;

use crate::error::CliError;
use crate::util::{
    CYAN, GREEN, Output, Overrides, RED, ensure_probe_available, load_settings,
};

/// Check command handler
pub fn cmd_check(
    config_path: Option<&Path>,
    overrides: Overrides,
    out: Output,
) -> Result<(), CliError> {
    let mut settings = load_settings(config_path)?;
    overrides.apply(&mut settings);

    validate_host(&settings.host).map_err(|e| CliError::InvalidHost {
        host: settings.host.clone(),
        reason: e.to_string(),
    })?;
    settings.validate()?;
    ensure_probe_available(&settings)?;

    let prober = settings.build_prober();
    let timeout = settings.effective_probe_timeout();

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Runtime(format!("Failed to create async runtime: {e}")))?;

    let started = Instant::now();
    let span = pingmon_core::trace_operation!(
        span_names::PROBE_ONCE,
        host = %settings.host,
        probe = %settings.probe
    );
    let reachable = runtime.block_on(prober.probe(&settings.host, timeout).instrument(span));
    let elapsed_ms = started.elapsed().as_millis();

    if reachable {
        if !out.quiet {
            println!(
                "{} {} {} [{}]",
                out.paint(GREEN, "✓"),
                settings.host,
                out.paint(CYAN, &format!("({elapsed_ms}ms)")),
                settings.probe
            );
        }
        Ok(())
    } else {
        if !out.quiet {
            println!(
                "{} {} [{}]",
                out.paint(RED, "✗"),
                settings.host,
                settings.probe
            );
        }
        Err(CliError::HostUnreachable(settings.host))
    }
}
