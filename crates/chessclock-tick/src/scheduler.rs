use std::time::{Duration, Instant};

use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

use crate::{BudgetLevel, TickConfig, TickMetrics, TickPolicy};

/// Returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Tick number, starting at 1.
    pub tick: u64,
    pub period: Duration,
    /// The loop woke up more than a tenth of a period late.
    pub overrun: bool,
    /// Whole periods skipped under [`TickPolicy::Skip`].
    pub ticks_skipped: u64,
}

/// Where the schedule goes after one wakeup.
#[derive(Debug, PartialEq, Eq)]
struct Reschedule {
    next: TokioInstant,
    overrun: bool,
    skipped: u64,
}

fn reschedule(
    policy: TickPolicy,
    due: TokioInstant,
    woke: TokioInstant,
    period: Duration,
) -> Reschedule {
    let late_by = woke.saturating_duration_since(due);
    let overrun = late_by > period / 10;

    match policy {
        TickPolicy::Skip => Reschedule {
            next: woke + period,
            overrun,
            skipped: if overrun { whole_periods(late_by, period) } else { 0 },
        },
        TickPolicy::Drop => Reschedule {
            next: due + period,
            overrun,
            skipped: 0,
        },
    }
}

fn whole_periods(span: Duration, period: Duration) -> u64 {
    let n = span.as_nanos() / period.as_nanos().max(1);
    u64::try_from(n).unwrap_or(u64::MAX)
}

/// Sleeps the sweep loop from one tick to the next.
pub struct TickScheduler {
    config: TickConfig,
    period: Duration,
    fired: u64,
    due: TokioInstant,
    sweep_started: Option<Instant>,
    metrics: TickMetrics,
}

impl TickScheduler {
    /// The first tick is due one period from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let period = config.tick_duration();
        debug!(
            rate_hz = config.tick_rate_hz,
            period = ?period,
            policy = ?config.policy,
            "tick scheduler ready"
        );

        Self {
            due: TokioInstant::now() + period,
            config,
            period,
            fired: 0,
            sweep_started: None,
            metrics: TickMetrics::default(),
        }
    }

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Sleeps until the next tick is due and starts timing the sweep.
    ///
    /// Cancel-safe: dropping the future before it resolves leaves the
    /// schedule untouched.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        time::sleep_until(self.due).await;

        let woke = TokioInstant::now();
        let step = reschedule(self.config.policy, self.due, woke, self.period);
        self.fired += 1;
        self.sweep_started = Some(Instant::now());

        if step.overrun {
            warn!(
                tick = self.fired,
                late = ?woke.saturating_duration_since(self.due),
                skipped = step.skipped,
                policy = ?self.config.policy,
                "tick woke up late"
            );
        }
        trace!(tick = self.fired, "tick");

        self.due = step.next;
        self.metrics.record_fire(step.overrun, step.skipped);

        TickInfo {
            tick: self.fired,
            period: self.period,
            overrun: step.overrun,
            ticks_skipped: step.skipped,
        }
    }

    /// Ends the sweep started by the last `wait_for_tick`.
    ///
    /// Checks the sweep against its budget and updates metrics. Without a
    /// pending tick this does nothing.
    pub fn record_tick_end(&mut self) {
        let Some(started) = self.sweep_started.take() else {
            return;
        };
        let elapsed = started.elapsed();
        let utilization = elapsed.as_secs_f64() / self.period.as_secs_f64();
        self.metrics.utilization = utilization;

        match self.config.budget_level(utilization) {
            BudgetLevel::Within => {}
            level => warn!(
                tick = self.fired,
                ?elapsed,
                budget = ?self.period,
                ?level,
                "room sweep used {:.0}% of the tick",
                utilization * 100.0
            ),
        }

        if self.config.metrics_enabled {
            self.metrics.record_sweep(elapsed);
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.fired
    }

    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    /// Rate after clamping.
    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }

    pub fn tick_duration(&self) -> Duration {
        self.period
    }
}
