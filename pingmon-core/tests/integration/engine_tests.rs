//! Integration tests for the monitor engine lifecycle
//!
//! Tokio time is paused in these tests, so interval sleeps complete as soon
//! as every task is idle and tick spacing can be asserted exactly.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use pingmon_core::{
    EventReceiver, ManualClock, MonitorEngine, MonitorEvent, Prober, RunStatus, StartError,
    Statistics, StopOutcome, event_channel,
};
use tokio::sync::Notify;
use tokio::time::Instant;

/// Prober that replays a fixed list of outcomes, then reports success
struct ScriptedProber {
    outcomes: Mutex<VecDeque<bool>>,
    calls: Mutex<Vec<Instant>>,
}

impl ScriptedProber {
    fn new(outcomes: &[bool]) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.iter().copied().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, _host: &str, _timeout: Duration) -> bool {
        self.calls.lock().unwrap().push(Instant::now());
        self.outcomes.lock().unwrap().pop_front().unwrap_or(true)
    }
}

/// Prober that never answers
struct HangingProber {
    entered: Arc<Notify>,
}

#[async_trait]
impl Prober for HangingProber {
    async fn probe(&self, _host: &str, _timeout: Duration) -> bool {
        self.entered.notify_one();
        std::future::pending::<bool>().await
    }
}

async fn next_event(rx: &mut EventReceiver) -> MonitorEvent {
    tokio::time::timeout(Duration::from_secs(600), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}

/// Collects events until `count` stats updates have been seen
async fn collect_ticks(rx: &mut EventReceiver, count: usize) -> Vec<MonitorEvent> {
    let mut events = Vec::new();
    let mut ticks = 0;
    while ticks < count {
        let event = next_event(rx).await;
        if matches!(event, MonitorEvent::StatsUpdated(_)) {
            ticks += 1;
        }
        events.push(event);
    }
    events
}

fn stats_of(event: &MonitorEvent) -> &Statistics {
    match event {
        MonitorEvent::StatsUpdated(stats) => stats,
        other => panic!("expected StatsUpdated, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn edge_triggered_status_changes_follow_probe_outcomes() {
    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let clock = ManualClock::new(t0);
    let prober = ScriptedProber::new(&[false, false, true, false]);
    let (tx, mut rx) = event_channel();
    let mut engine = MonitorEngine::new(prober.clone(), tx).with_clock(Arc::new(clock.clone()));

    engine.start("8.8.8.8", 1).unwrap();
    assert!(engine.is_running());
    assert_eq!(engine.current_host(), Some("8.8.8.8"));

    let mut events = Vec::new();
    for _ in 0..4 {
        let batch = collect_ticks(&mut rx, 1).await;
        events.extend(batch);
        // The loop is parked in its interval sleep until this task yields
        clock.advance(chrono::Duration::minutes(1));
    }

    assert_eq!(engine.stop().await, StopOutcome::Stopped);

    let kinds: Vec<String> = events
        .iter()
        .map(|event| match event {
            MonitorEvent::StatusChanged { is_up } => format!("SC({is_up})"),
            MonitorEvent::StatsUpdated(_) => "SU".to_string(),
            MonitorEvent::Error(msg) => format!("E({msg})"),
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["SC(false)", "SU", "SU", "SC(true)", "SU", "SC(false)", "SU"]
    );

    let snapshots: Vec<(u64, u64)> = events
        .iter()
        .filter(|e| matches!(e, MonitorEvent::StatsUpdated(_)))
        .map(|e| {
            let s = stats_of(e);
            (s.total_probes, s.failed_probes)
        })
        .collect();
    assert_eq!(snapshots, vec![(1, 1), (2, 2), (3, 2), (4, 3)]);

    let stats = engine.statistics();
    assert_eq!(stats.total_probes, 4);
    assert_eq!(stats.failed_probes, 3);
    assert_eq!(stats.status, RunStatus::Stopped);
    assert_eq!(stats.started_at, Some(t0));
    assert_eq!(stats.last_failure_at, Some(t0 + chrono::Duration::minutes(3)));
    assert_eq!(stats.stopped_at, Some(t0 + chrono::Duration::minutes(4)));
    assert_eq!(engine.uptime_string(), "0h 4m");

    // No stats update after stop
    assert!(rx.try_recv().is_err());
    assert!(!engine.is_running());
}

#[tokio::test(start_paused = true)]
async fn probes_are_spaced_by_the_interval() {
    let prober = ScriptedProber::new(&[]);
    let (tx, mut rx) = event_channel();
    let mut engine = MonitorEngine::new(prober.clone(), tx);

    engine.start("example.com", 5).unwrap();
    collect_ticks(&mut rx, 3).await;
    engine.stop().await;

    let calls = prober.call_times();
    assert_eq!(calls.len(), 3);
    for pair in calls.windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::from_secs(5));
    }
}

#[tokio::test(start_paused = true)]
async fn healthy_host_never_reports_status_change() {
    let prober = ScriptedProber::new(&[true, true, true]);
    let (tx, mut rx) = event_channel();
    let mut engine = MonitorEngine::new(prober, tx);

    engine.start("8.8.8.8", 1).unwrap();
    let events = collect_ticks(&mut rx, 3).await;
    engine.stop().await;

    assert!(
        events
            .iter()
            .all(|e| matches!(e, MonitorEvent::StatsUpdated(_)))
    );
    assert_eq!(engine.statistics().failed_probes, 0);
}

#[tokio::test(start_paused = true)]
async fn second_start_is_rejected_and_first_run_continues() {
    let prober = ScriptedProber::new(&[]);
    let (tx, mut rx) = event_channel();
    let mut engine = MonitorEngine::new(prober, tx);

    engine.start("8.8.8.8", 1).unwrap();
    collect_ticks(&mut rx, 2).await;
    let before = engine.statistics();

    assert_eq!(engine.start("1.1.1.1", 1), Err(StartError::AlreadyRunning));
    assert_eq!(
        next_event(&mut rx).await,
        MonitorEvent::Error("Monitoring is already running".to_string())
    );
    assert_eq!(engine.current_host(), Some("8.8.8.8"));
    assert_eq!(engine.statistics(), before);
    assert_eq!(engine.statistics().status, RunStatus::Running);

    let next = collect_ticks(&mut rx, 1).await;
    assert_eq!(stats_of(next.last().unwrap()).total_probes, 3);

    engine.stop().await;
}

#[tokio::test(start_paused = true)]
async fn invalid_start_leaves_previous_statistics_untouched() {
    let prober = ScriptedProber::new(&[false]);
    let (tx, mut rx) = event_channel();
    let mut engine = MonitorEngine::new(prober, tx);

    engine.start("8.8.8.8", 1).unwrap();
    collect_ticks(&mut rx, 2).await;
    engine.stop().await;
    let finished = engine.statistics();

    assert!(matches!(
        engine.start("bad host", 1),
        Err(StartError::InvalidHost(_))
    ));
    assert_eq!(engine.start("8.8.8.8", 0), Err(StartError::InvalidInterval(0)));
    assert_eq!(engine.statistics(), finished);
    assert!(!engine.is_running());
}

#[tokio::test(start_paused = true)]
async fn stop_right_after_start_probes_at_most_once() {
    let prober = ScriptedProber::new(&[]);
    let (tx, mut rx) = event_channel();
    let mut engine = MonitorEngine::new(prober.clone(), tx);

    engine.start("8.8.8.8", 1).unwrap();
    assert_eq!(engine.stop().await, StopOutcome::Stopped);

    let stats = engine.statistics();
    assert!(stats.total_probes <= 1);
    assert_eq!(stats.status, RunStatus::Stopped);
    assert!(prober.call_times().len() <= 1);

    // Nothing arrives after the engine reports stopped
    while let Ok(event) = rx.try_recv() {
        assert!(matches!(event, MonitorEvent::StatsUpdated(_)));
    }
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn stop_twice_is_a_noop() {
    let prober = ScriptedProber::new(&[]);
    let (tx, mut rx) = event_channel();
    let mut engine = MonitorEngine::new(prober, tx);

    engine.start("8.8.8.8", 1).unwrap();
    collect_ticks(&mut rx, 1).await;

    assert_eq!(engine.stop().await, StopOutcome::Stopped);
    let stopped = engine.statistics();
    assert_eq!(engine.stop().await, StopOutcome::NotRunning);
    assert_eq!(engine.statistics(), stopped);
}

#[tokio::test(start_paused = true)]
async fn restart_begins_with_fresh_statistics() {
    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let clock = ManualClock::new(t0);
    let prober = ScriptedProber::new(&[false, false]);
    let (tx, mut rx) = event_channel();
    let mut engine = MonitorEngine::new(prober, tx).with_clock(Arc::new(clock.clone()));

    engine.start("8.8.8.8", 1).unwrap();
    collect_ticks(&mut rx, 2).await;
    engine.stop().await;
    assert_eq!(engine.statistics().failed_probes, 2);

    clock.advance(chrono::Duration::hours(1));
    engine.start("example.org", 2).unwrap();
    let events = collect_ticks(&mut rx, 1).await;
    let first = stats_of(events.last().unwrap());
    assert_eq!(first.total_probes, 1);
    assert_eq!(first.failed_probes, 0);
    assert_eq!(first.last_failure_at, None);
    assert_eq!(first.started_at, Some(t0 + chrono::Duration::hours(1)));
    assert_eq!(engine.current_host(), Some("example.org"));

    engine.stop().await;
}

#[tokio::test(start_paused = true)]
async fn hung_probe_is_aborted_after_stop_timeout() {
    let entered = Arc::new(Notify::new());
    let prober = Arc::new(HangingProber {
        entered: Arc::clone(&entered),
    });
    let (tx, mut rx) = event_channel();
    let mut engine = MonitorEngine::new(prober, tx).with_stop_timeout(Duration::from_secs(2));

    engine.start("8.8.8.8", 1).unwrap();
    entered.notified().await;

    let begun = Instant::now();
    assert_eq!(engine.stop().await, StopOutcome::TimedOut);
    assert!(begun.elapsed() >= Duration::from_secs(2));
    assert!(!engine.is_running());
    assert_eq!(engine.statistics().status, RunStatus::Stopped);

    match next_event(&mut rx).await {
        MonitorEvent::Error(msg) => assert!(msg.contains("2000 ms")),
        other => panic!("expected Error, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn abandoned_stop_still_leaves_run_stopped() {
    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let clock = ManualClock::new(t0);
    let entered = Arc::new(Notify::new());
    let prober = Arc::new(HangingProber {
        entered: Arc::clone(&entered),
    });
    let (tx, _rx) = event_channel();
    let mut engine = MonitorEngine::new(prober, tx).with_clock(Arc::new(clock.clone()));

    engine.start("8.8.8.8", 1).unwrap();
    entered.notified().await;
    clock.advance(chrono::Duration::minutes(3));

    let abandoned = tokio::time::timeout(Duration::from_millis(100), engine.stop()).await;
    assert!(abandoned.is_err());

    assert!(!engine.is_running());
    let stats = engine.statistics();
    assert_eq!(stats.status, RunStatus::Stopped);
    assert_eq!(stats.stopped_at, Some(t0 + chrono::Duration::minutes(3)));
    assert_eq!(engine.stop().await, StopOutcome::NotRunning);
}

#[tokio::test(start_paused = true)]
async fn engine_keeps_running_without_an_observer() {
    let prober = ScriptedProber::new(&[false, true]);
    let (tx, rx) = event_channel();
    drop(rx);
    let mut engine = MonitorEngine::new(prober.clone(), tx);

    engine.start("8.8.8.8", 1).unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(engine.stop().await, StopOutcome::Stopped);
    assert_eq!(prober.call_times().len(), 3);
    assert_eq!(engine.statistics().total_probes, 3);
}
