//! Continuous monitoring command.

use std::path::Path;

use pingmon_core::{
    EventReceiver, MonitorEngine, MonitorEvent, MonitorSettings, Statistics, StopOutcome,
    event_channel,
};
use serde::Serialize;

use crate::error::CliError;
use crate::util::{
    BOLD, GREEN, Output, Overrides, RED, YELLOW, ensure_probe_available, load_settings, timestamp,
};

/// Parameters for the monitor command
pub struct MonitorParams {
    pub overrides: Overrides,
    pub count: Option<u64>,
    pub json: bool,
}

/// One line of `--json` output
#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JsonLine<'a> {
    StatusChanged {
        timestamp: String,
        host: &'a str,
        is_up: bool,
    },
    StatsUpdated {
        timestamp: String,
        stats: &'a Statistics,
    },
    Error {
        timestamp: String,
        message: &'a str,
    },
    Summary {
        host: &'a str,
        stop: &'static str,
        uptime: String,
        success_rate: f64,
        stats: &'a Statistics,
    },
}

/// What the session ended with
struct Session {
    outcome: StopOutcome,
    last_up: bool,
    stats: Statistics,
    uptime: String,
}

/// Monitor command handler
pub fn cmd_monitor(
    config_path: Option<&Path>,
    params: MonitorParams,
    out: Output,
) -> Result<(), CliError> {
    let mut settings = load_settings(config_path)?;
    params.overrides.apply(&mut settings);
    settings.validate()?;
    ensure_probe_available(&settings)?;

    if params.count == Some(0) {
        return Err(CliError::Config("--count must be at least 1".to_string()));
    }

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Runtime(format!("Failed to create async runtime: {e}")))?;

    let session = runtime.block_on(run_session(&settings, params.count, params.json, out))?;

    if params.json {
        print_json(&JsonLine::Summary {
            host: &settings.host,
            stop: stop_label(session.outcome),
            uptime: session.uptime.clone(),
            success_rate: session.stats.success_rate(),
            stats: &session.stats,
        })?;
    } else if !out.quiet {
        print_summary(&settings.host, &session, out);
    }

    if session.last_up {
        Ok(())
    } else {
        Err(CliError::HostUnreachable(settings.host))
    }
}

async fn run_session(
    settings: &MonitorSettings,
    count: Option<u64>,
    json: bool,
    out: Output,
) -> Result<Session, CliError> {
    let (tx, mut rx) = event_channel();
    let mut engine = MonitorEngine::new(settings.build_prober(), tx)
        .with_probe_timeout(settings.effective_probe_timeout())
        .with_stop_timeout(settings.effective_stop_timeout());

    engine
        .start(&settings.host, settings.interval_secs)
        .map_err(|e| CliError::Start(e.to_string()))?;

    if !json && !out.quiet {
        println!(
            "Monitoring {} every {}s with {} probes (Ctrl-C to stop)",
            out.paint(BOLD, &settings.host),
            settings.interval_secs,
            settings.probe
        );
    }

    let mut last_up = true;
    let mut ticks: u64 = 0;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                break;
            }
            event = rx.recv() => {
                let Some(event) = event else { break };
                if let MonitorEvent::StatusChanged { is_up } = event {
                    last_up = is_up;
                }
                let is_tick = matches!(event, MonitorEvent::StatsUpdated(_));
                report_event(&settings.host, &event, json, out)?;
                if is_tick {
                    ticks += 1;
                    if count.is_some_and(|limit| ticks >= limit) {
                        break;
                    }
                }
            }
        }
    }

    let outcome = engine.stop().await;
    drain_errors(&mut rx, &settings.host, json, out)?;

    Ok(Session {
        outcome,
        last_up,
        stats: engine.statistics(),
        uptime: engine.uptime_string(),
    })
}

/// Prints events that arrived while stopping; only errors are relevant then
fn drain_errors(
    rx: &mut EventReceiver,
    host: &str,
    json: bool,
    out: Output,
) -> Result<(), CliError> {
    while let Ok(event) = rx.try_recv() {
        if matches!(event, MonitorEvent::Error(_)) {
            report_event(host, &event, json, out)?;
        }
    }
    Ok(())
}

fn report_event(
    host: &str,
    event: &MonitorEvent,
    json: bool,
    out: Output,
) -> Result<(), CliError> {
    if json {
        let line = match event {
            MonitorEvent::StatusChanged { is_up } => JsonLine::StatusChanged {
                timestamp: timestamp(),
                host,
                is_up: *is_up,
            },
            MonitorEvent::StatsUpdated(stats) => JsonLine::StatsUpdated {
                timestamp: timestamp(),
                stats,
            },
            MonitorEvent::Error(message) => JsonLine::Error {
                timestamp: timestamp(),
                message,
            },
        };
        return print_json(&line);
    }

    match event {
        MonitorEvent::Error(message) => {
            eprintln!(
                "[{}] {}",
                timestamp(),
                out.paint(YELLOW, &format!("Error: {message}"))
            );
        }
        _ if out.quiet => {}
        MonitorEvent::StatusChanged { is_up: false } => {
            println!(
                "[{}] {}",
                timestamp(),
                out.paint(RED, &format!("Host {host} is unreachable"))
            );
        }
        MonitorEvent::StatusChanged { is_up: true } => {
            println!(
                "[{}] {}",
                timestamp(),
                out.paint(GREEN, &format!("Connection to {host} restored"))
            );
        }
        MonitorEvent::StatsUpdated(stats) => {
            println!(
                "[{}] probes: {} total, {} failed ({:.1}% success)",
                timestamp(),
                stats.total_probes,
                stats.failed_probes,
                stats.success_rate()
            );
        }
    }
    Ok(())
}

fn print_json(line: &JsonLine<'_>) -> Result<(), CliError> {
    let text = serde_json::to_string(line).map_err(|e| CliError::Serialization(e.to_string()))?;
    println!("{text}");
    Ok(())
}

const fn stop_label(outcome: StopOutcome) -> &'static str {
    match outcome {
        StopOutcome::Stopped => "stopped",
        StopOutcome::TimedOut => "timed_out",
        StopOutcome::NotRunning => "not_running",
    }
}

fn print_summary(host: &str, session: &Session, out: Output) {
    let stats = &session.stats;
    let last_failure = stats.last_failure_at.map_or_else(
        || "never".to_string(),
        |at| {
            at.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        },
    );

    println!();
    println!("{}", out.paint(BOLD, &format!("Summary for {host}:")));
    println!("  Status:        {}", stats.status);
    println!("  Total probes:  {}", stats.total_probes);
    println!("  Failed probes: {}", stats.failed_probes);
    println!("  Success rate:  {:.1}%", stats.success_rate());
    println!("  Uptime:        {}", session.uptime);
    println!("  Last failure:  {last_failure}");
    if session.outcome == StopOutcome::TimedOut {
        println!(
            "  {}",
            out.paint(YELLOW, "Monitoring loop was aborted while stopping")
        );
    }
}
