//! Tick Period Ramp
//!
//! Open-loop speed-up: every `ramp_every` points of score the tick period
//! shrinks by `step_ms`, never below `min_period_ms`. Each ramp point
//! restarts the timer, even when the period is already at the floor.

use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::game::config::SchedulerConfig;

/// Tick period controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickScheduler {
    period_ms: u64,
    config: SchedulerConfig,
}

impl TickScheduler {
    /// Start at the configured initial period.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            period_ms: config.initial_period_ms,
            config,
        }
    }

    /// Current period in milliseconds.
    #[inline]
    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Current period as a `Duration`.
    #[inline]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Report the score after a tick.
    ///
    /// Returns the new period when the timer must be restarted.
    pub fn on_score(&mut self, score: u64) -> Option<u64> {
        if score == 0 || self.config.ramp_every == 0 || score % self.config.ramp_every != 0 {
            return None;
        }

        self.period_ms = self
            .period_ms
            .saturating_sub(self.config.step_ms)
            .max(self.config.min_period_ms);
        Some(self.period_ms)
    }
}
