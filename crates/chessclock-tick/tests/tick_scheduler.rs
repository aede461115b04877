//! Integration tests for the tick scheduler.
//!
//! Uses paused Tokio time so `sleep_until` resolves as soon as the runtime
//! has nothing else to do, and `tokio::time::advance` simulates a stalled
//! loop.

use std::time::Duration;

use chessclock_tick::{TickConfig, TickPolicy, TickScheduler};

fn config_10hz() -> TickConfig {
    TickConfig::with_rate(10)
}

// =========================================================================
// TickConfig
// =========================================================================

#[test]
fn test_default_config_is_10hz_skip() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.tick_rate_hz, 10);
    assert_eq!(cfg.policy, TickPolicy::Skip);
    assert_eq!(cfg.tick_duration(), Duration::from_millis(100));
}

#[test]
fn test_with_rate_20hz_has_50ms_period() {
    assert_eq!(
        TickConfig::with_rate(20).tick_duration(),
        Duration::from_millis(50)
    );
}

#[test]
fn test_scheduler_zero_rate_runs_at_min_rate() {
    let s = TickScheduler::with_rate(0);
    assert_eq!(s.tick_rate_hz(), 1);
    assert_eq!(s.tick_duration(), Duration::from_secs(1));
}

#[test]
fn test_scheduler_initial_state() {
    let s = TickScheduler::new(config_10hz());
    assert_eq!(s.tick_count(), 0);
    assert_eq!(s.metrics().ticks, 0);
    assert_eq!(s.metrics().max_sweep, Duration::ZERO);
}

// =========================================================================
// Firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_wait_for_tick_fires_after_one_period() {
    let start = tokio::time::Instant::now();
    let mut s = TickScheduler::new(config_10hz());

    let info = s.wait_for_tick().await;

    assert_eq!(info.tick, 1);
    assert_eq!(info.period, Duration::from_millis(100));
    assert!(!info.overrun);
    assert_eq!(info.ticks_skipped, 0);
    assert_eq!(start.elapsed(), Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn test_ticks_are_numbered_monotonically() {
    let mut s = TickScheduler::new(config_10hz());

    for expected in 1..=5 {
        assert_eq!(s.wait_for_tick().await.tick, expected);
        s.record_tick_end();
    }
    assert_eq!(s.tick_count(), 5);
    assert_eq!(s.metrics().ticks, 5);
}

// =========================================================================
// Overrun policies
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_skip_policy_stall_skips_missed_periods() {
    let mut s = TickScheduler::new(config_10hz());

    // Deadline at 100 ms; loop stalls until 350 ms.
    tokio::time::advance(Duration::from_millis(350)).await;
    let info = s.wait_for_tick().await;

    assert!(info.overrun);
    assert_eq!(info.ticks_skipped, 2);
    assert_eq!(s.metrics().overruns, 1);
    assert_eq!(s.metrics().skipped, 2);

    // Next tick is a full period after the late wakeup.
    let before = tokio::time::Instant::now();
    let info = s.wait_for_tick().await;
    assert!(!info.overrun);
    assert_eq!(before.elapsed(), Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn test_drop_policy_stall_keeps_original_cadence() {
    let mut s = TickScheduler::new(TickConfig {
        policy: TickPolicy::Drop,
        ..config_10hz()
    });

    tokio::time::advance(Duration::from_millis(350)).await;
    let info = s.wait_for_tick().await;
    assert!(info.overrun);
    assert_eq!(info.ticks_skipped, 0);

    // The 200 ms deadline has already passed, so this fires immediately.
    let before = tokio::time::Instant::now();
    s.wait_for_tick().await;
    assert_eq!(before.elapsed(), Duration::ZERO);
}

// =========================================================================
// Metrics
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_record_tick_end_without_wait_is_noop() {
    let mut s = TickScheduler::new(config_10hz());
    s.record_tick_end();
    assert_eq!(s.metrics().utilization, 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_record_tick_end_tracks_real_sweep_time() {
    let mut s = TickScheduler::new(config_10hz());

    s.wait_for_tick().await;
    // Sweep time is measured on the wall clock, not Tokio's paused clock.
    std::thread::sleep(Duration::from_micros(200));
    s.record_tick_end();

    let m = s.metrics();
    assert!(m.max_sweep >= Duration::from_micros(200));
    assert!(m.mean_sweep > Duration::ZERO);
    assert!(m.utilization > 0.0);
    assert!(m.utilization < 1.0);
}

#[tokio::test(start_paused = true)]
async fn test_metrics_disabled_leaves_timings_zero() {
    let mut s = TickScheduler::new(TickConfig {
        metrics_enabled: false,
        ..config_10hz()
    });

    s.wait_for_tick().await;
    std::thread::sleep(Duration::from_micros(200));
    s.record_tick_end();

    assert_eq!(s.metrics().mean_sweep, Duration::ZERO);
    assert_eq!(s.metrics().max_sweep, Duration::ZERO);
    assert_eq!(s.metrics().ticks, 1);
}

// =========================================================================
// Loop pattern
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_select_loop_stops_on_shutdown_signal() {
    let mut s = TickScheduler::new(config_10hz());
    let (tx, mut rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(350)).await;
        let _ = tx.send(());
    });

    let mut fired = 0u64;
    loop {
        tokio::select! {
            _ = &mut rx => break,
            info = s.wait_for_tick() => {
                fired += 1;
                assert_eq!(info.tick, fired);
                s.record_tick_end();
            }
        }
    }

    assert_eq!(fired, 3);
}
