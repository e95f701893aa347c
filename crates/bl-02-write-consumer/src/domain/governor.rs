//! # Poll Governor
//!
//! Rate-adaptation arithmetic of the flush loop, kept free of I/O and clocks
//! so it can be tested tick by tick.
//!
//! - depth >= threshold: flush; if `depth / threshold > overload_factor` the
//!   interval halves (never below the floor)
//! - otherwise: count an idle tick; once the count exceeds the idle limit the
//!   interval returns to its base value

use crate::config::ConsumerConfig;
use std::time::Duration;

/// What the loop should do after observing the queue depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    /// Drain and persist.
    Flush {
        /// The interval was halved because of overload.
        halved: bool,
    },
    /// Stay idle.
    Idle {
        /// The interval was reset to its base value.
        reset: bool,
    },
}

/// Mutable poll-interval state owned by one flush loop.
#[derive(Debug, Clone)]
pub struct PollGovernor {
    flush_threshold: usize,
    overload_factor: f64,
    idle_cycles_before_reset: u32,
    base_interval: Duration,
    min_interval: Duration,
    current_interval: Duration,
    idle_cycles: u32,
}

impl PollGovernor {
    /// Governor starting at the configured base interval.
    pub fn new(config: &ConsumerConfig) -> Self {
        Self {
            flush_threshold: config.flush_threshold,
            overload_factor: config.overload_factor,
            idle_cycles_before_reset: config.idle_cycles_before_reset,
            base_interval: config.base_poll_interval,
            min_interval: config.min_poll_interval,
            current_interval: config.base_poll_interval,
            idle_cycles: 0,
        }
    }

    /// Interval to sleep before the next tick.
    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    /// Consecutive idle ticks since the last flush or reset.
    pub fn idle_cycles(&self) -> u32 {
        self.idle_cycles
    }

    /// Decide on one tick given the observed queue depth.
    pub fn observe(&mut self, depth: usize) -> TickDecision {
        if depth >= self.flush_threshold {
            self.idle_cycles = 0;
            let halved = self.is_overloaded(depth);
            if halved {
                self.current_interval = (self.current_interval / 2).max(self.min_interval);
            }
            TickDecision::Flush { halved }
        } else {
            self.idle_cycles += 1;
            let reset = self.idle_cycles > self.idle_cycles_before_reset;
            if reset {
                self.current_interval = self.base_interval;
                self.idle_cycles = 0;
            }
            TickDecision::Idle { reset }
        }
    }

    fn is_overloaded(&self, depth: usize) -> bool {
        depth as f64 / self.flush_threshold as f64 > self.overload_factor
    }
}
