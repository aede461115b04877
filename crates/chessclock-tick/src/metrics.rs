use std::time::Duration;

/// Weight of the newest sample in the moving average.
const SMOOTHING: f64 = 0.1;

/// Counters and sweep timings kept by a [`TickScheduler`](crate::TickScheduler).
///
/// Sweep time is the wall-clock span between `wait_for_tick` returning and
/// `record_tick_end`.
#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    /// Ticks fired.
    pub ticks: u64,
    /// Wakeups more than a tenth of a period late.
    pub overruns: u64,
    /// Whole periods skipped under [`TickPolicy::Skip`](crate::TickPolicy::Skip).
    pub skipped: u64,
    /// Exponential moving average of sweep time.
    pub mean_sweep: Duration,
    /// Slowest sweep seen.
    pub max_sweep: Duration,
    /// Last sweep's share of the period; above 1.0 means it ran over.
    pub utilization: f64,
}

impl TickMetrics {
    pub(crate) fn record_fire(&mut self, overrun: bool, skipped: u64) {
        self.ticks += 1;
        self.overruns += u64::from(overrun);
        self.skipped += skipped;
    }

    pub(crate) fn record_sweep(&mut self, elapsed: Duration) {
        self.max_sweep = self.max_sweep.max(elapsed);
        let mean = self.mean_sweep.as_secs_f64();
        self.mean_sweep =
            Duration::from_secs_f64(mean + SMOOTHING * (elapsed.as_secs_f64() - mean));
    }
}
