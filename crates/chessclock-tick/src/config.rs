//! Tick rate, overrun policy and sweep budget.

use std::time::Duration;

use tracing::warn;

/// What to do when the loop wakes up late.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TickPolicy {
    /// Forget the missed ticks; the next one is a full period from the
    /// late wakeup.
    #[default]
    Skip,
    /// Ignore the overrun: the next deadline is the missed one plus a
    /// period, with no rescheduling. A deadline that has already passed
    /// resolves as soon as `wait_for_tick` is called.
    Drop,
}

/// How much of its period a sweep used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetLevel {
    Within,
    Warn,
    Critical,
}

/// Scheduler settings. Run through [`TickConfig::validated`] before use.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Sweeps per second, `1..=128`.
    pub tick_rate_hz: u32,
    pub policy: TickPolicy,
    /// Share of the period a sweep may use before a warning is logged.
    pub budget_warn_threshold: f64,
    /// Share of the period at which a sweep counts as over budget.
    pub budget_critical_threshold: f64,
    /// Track sweep durations in [`TickMetrics`](crate::TickMetrics).
    pub metrics_enabled: bool,
}

impl TickConfig {
    pub const DEFAULT_TICK_RATE_HZ: u32 = 10;
    pub const MIN_TICK_RATE_HZ: u32 = 1;
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// Defaults, sweeping `tick_rate_hz` times a second.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Self::default()
        }
    }

    /// Pulls every field back into range.
    ///
    /// The rate is clamped to `MIN_TICK_RATE_HZ..=MAX_TICK_RATE_HZ`, both
    /// thresholds to `0.0..=1.0`, and the warn threshold never exceeds
    /// the critical one.
    pub fn validated(self) -> Self {
        let tick_rate_hz = self
            .tick_rate_hz
            .clamp(Self::MIN_TICK_RATE_HZ, Self::MAX_TICK_RATE_HZ);
        if tick_rate_hz != self.tick_rate_hz {
            warn!(
                requested = self.tick_rate_hz,
                using = tick_rate_hz,
                "tick rate out of range"
            );
        }
        // max/min rather than clamp: NaN collapses to 0.0 instead of panicking.
        let critical = self.budget_critical_threshold.max(0.0).min(1.0);
        let warn_at = self.budget_warn_threshold.max(0.0).min(critical);

        Self {
            tick_rate_hz,
            budget_warn_threshold: warn_at,
            budget_critical_threshold: critical,
            ..self
        }
    }

    /// One period at the configured rate, to the nanosecond.
    pub fn tick_duration(&self) -> Duration {
        let hz = u64::from(self.tick_rate_hz.max(Self::MIN_TICK_RATE_HZ));
        Duration::from_nanos(1_000_000_000 / hz)
    }

    /// Classifies a sweep that used `utilization` of its period.
    pub fn budget_level(&self, utilization: f64) -> BudgetLevel {
        if utilization >= self.budget_critical_threshold {
            BudgetLevel::Critical
        } else if utilization >= self.budget_warn_threshold {
            BudgetLevel::Warn
        } else {
            BudgetLevel::Within
        }
    }
}

impl Default for TickConfig {
    /// 10 Hz, [`TickPolicy::Skip`], warn at 80% of the period.
    fn default() -> Self {
        Self {
            tick_rate_hz: Self::DEFAULT_TICK_RATE_HZ,
            policy: TickPolicy::Skip,
            budget_warn_threshold: 0.8,
            budget_critical_threshold: 1.0,
            metrics_enabled: true,
        }
    }
}
