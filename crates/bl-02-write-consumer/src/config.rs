//! # Consumer Configuration
//!
//! Fixed at construction. Durations are (de)serialized as milliseconds:
//!
//! ```json
//! {
//!     "flush_threshold": 32,
//!     "base_poll_interval_ms": 50,
//!     "overload_factor": 1.1,
//!     "idle_cycles_before_reset": 10,
//!     "min_poll_interval_ms": 1,
//!     "write_failure_policy": "discard"
//! }
//! ```

use crate::domain::ConsumerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Items queued before a tick flushes.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 32;
/// Sleep between ticks when not overloaded.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Ratio of depth to threshold above which the interval halves.
pub const DEFAULT_OVERLOAD_FACTOR: f64 = 1.1;
/// Idle ticks tolerated before the interval resets.
pub const DEFAULT_IDLE_CYCLES_BEFORE_RESET: u32 = 10;
/// Lower bound for the halved interval.
pub const DEFAULT_MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// What happens to a batch whose write failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteFailurePolicy {
    /// Drop the batch and keep the loop running. Items are lost.
    #[default]
    Discard,
    /// Put the batch back at the head of the queue for the next flush. A batch
    /// that keeps failing is retried forever and grows with every tick.
    Requeue,
}

/// Write consumer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumerConfig {
    /// Queue depth that triggers a flush on a tick.
    pub flush_threshold: usize,
    /// Poll interval at start and after an idle reset.
    #[serde(rename = "base_poll_interval_ms", with = "duration_ms")]
    pub base_poll_interval: Duration,
    /// Overload ratio (depth / threshold) above which the interval halves.
    pub overload_factor: f64,
    /// Consecutive idle ticks tolerated before the interval resets.
    pub idle_cycles_before_reset: u32,
    /// Floor for the halved interval.
    #[serde(rename = "min_poll_interval_ms", with = "duration_ms")]
    pub min_poll_interval: Duration,
    /// Failed-batch handling.
    pub write_failure_policy: WriteFailurePolicy,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            base_poll_interval: DEFAULT_POLL_INTERVAL,
            overload_factor: DEFAULT_OVERLOAD_FACTOR,
            idle_cycles_before_reset: DEFAULT_IDLE_CYCLES_BEFORE_RESET,
            min_poll_interval: DEFAULT_MIN_POLL_INTERVAL,
            write_failure_policy: WriteFailurePolicy::Discard,
        }
    }
}

impl ConsumerConfig {
    /// Small batches and a short interval for tests.
    pub fn for_testing() -> Self {
        Self {
            flush_threshold: 4,
            base_poll_interval: Duration::from_millis(10),
            ..Self::default()
        }
    }

    /// Set the flush threshold.
    pub fn with_flush_threshold(mut self, threshold: usize) -> Self {
        self.flush_threshold = threshold;
        self
    }

    /// Set the base poll interval.
    pub fn with_base_poll_interval(mut self, interval: Duration) -> Self {
        self.base_poll_interval = interval;
        self
    }

    /// Set the overload factor.
    pub fn with_overload_factor(mut self, factor: f64) -> Self {
        self.overload_factor = factor;
        self
    }

    /// Set the idle ticks tolerated before a reset.
    pub fn with_idle_cycles_before_reset(mut self, cycles: u32) -> Self {
        self.idle_cycles_before_reset = cycles;
        self
    }

    /// Set the interval floor.
    pub fn with_min_poll_interval(mut self, interval: Duration) -> Self {
        self.min_poll_interval = interval;
        self
    }

    /// Set the failed-batch policy.
    pub fn with_write_failure_policy(mut self, policy: WriteFailurePolicy) -> Self {
        self.write_failure_policy = policy;
        self
    }

    /// Reject values the loop cannot run with.
    pub fn validate(&self) -> Result<(), ConsumerError> {
        if self.flush_threshold == 0 {
            return Err(ConsumerError::InvalidConfig(
                "flush_threshold must be positive".to_string(),
            ));
        }
        if self.base_poll_interval.is_zero() {
            return Err(ConsumerError::InvalidConfig(
                "base_poll_interval must be positive".to_string(),
            ));
        }
        if self.min_poll_interval.is_zero() {
            return Err(ConsumerError::InvalidConfig(
                "min_poll_interval must be positive".to_string(),
            ));
        }
        if self.min_poll_interval > self.base_poll_interval {
            return Err(ConsumerError::InvalidConfig(format!(
                "min_poll_interval ({:?}) exceeds base_poll_interval ({:?})",
                self.min_poll_interval, self.base_poll_interval
            )));
        }
        if !self.overload_factor.is_finite() || self.overload_factor < 1.0 {
            return Err(ConsumerError::InvalidConfig(format!(
                "overload_factor must be a finite value >= 1.0, got {}",
                self.overload_factor
            )));
        }
        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
