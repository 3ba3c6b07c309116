//! Probe Pacing - Jittered Spacing Between Probe Launches
//!
//! Launches are spaced by a uniformly random delay so that a sweep over
//! hundreds of pairs does not burst the upstream relay. Only launches
//! are spaced; completions are never waited on.

use std::time::Duration;

use rand::Rng;

use crate::config::SchedulerConfig;

/// Uniform delay window `[min, max]` in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
  min_ms: u64,
  max_ms: u64,
}

impl Pacing {
  /// Build a window; bounds are swapped if given inverted.
  pub fn new(min_ms: u64, max_ms: u64) -> Self {
    Self {
      min_ms: min_ms.min(max_ms),
      max_ms: min_ms.max(max_ms),
    }
  }

  /// No delay between launches (tests, simulations).
  pub const fn none() -> Self {
    Self { min_ms: 0, max_ms: 0 }
  }

  pub fn from_config(config: &SchedulerConfig) -> Self {
    Self::new(config.jitter_min_ms, config.jitter_max_ms)
  }

  /// Draw the next inter-launch delay.
  pub fn next_delay(&self) -> Duration {
    if self.max_ms == 0 {
      return Duration::ZERO;
    }
    let ms = rand::thread_rng().gen_range(self.min_ms..=self.max_ms);
    Duration::from_millis(ms)
  }
}
