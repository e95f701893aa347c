//! Lock-free consumer statistics.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters of one consumer.
#[derive(Debug, Default)]
pub struct ConsumerStats {
    batches_flushed: AtomicU64,
    items_persisted: AtomicU64,
    failed_batches: AtomicU64,
    items_discarded: AtomicU64,
    items_requeued: AtomicU64,
    overload_halvings: AtomicU64,
    idle_resets: AtomicU64,
    interruptions: AtomicU64,
}

/// Point-in-time copy of [`ConsumerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Batches persisted successfully
    pub batches_flushed: u64,
    /// Items persisted successfully
    pub items_persisted: u64,
    /// Batches whose write failed
    pub failed_batches: u64,
    /// Items dropped after a failed write
    pub items_discarded: u64,
    /// Items put back in the queue after a failed write
    pub items_requeued: u64,
    /// Times the poll interval was halved
    pub overload_halvings: u64,
    /// Times the poll interval was reset after idling
    pub idle_resets: u64,
    /// Times the loop was stopped by an external shutdown signal
    pub interruptions: u64,
}

impl ConsumerStats {
    pub(crate) fn record_flush(&self, items: usize) {
        self.batches_flushed.fetch_add(1, Ordering::Relaxed);
        self.items_persisted.fetch_add(items as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed_batches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self, items: usize) {
        self.items_discarded.fetch_add(items as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_requeued(&self, items: usize) {
        self.items_requeued.fetch_add(items as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_halving(&self) {
        self.overload_halvings.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_idle_reset(&self) {
        self.idle_resets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_interruption(&self) {
        self.interruptions.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            batches_flushed: self.batches_flushed.load(Ordering::Relaxed),
            items_persisted: self.items_persisted.load(Ordering::Relaxed),
            failed_batches: self.failed_batches.load(Ordering::Relaxed),
            items_discarded: self.items_discarded.load(Ordering::Relaxed),
            items_requeued: self.items_requeued.load(Ordering::Relaxed),
            overload_halvings: self.overload_halvings.load(Ordering::Relaxed),
            idle_resets: self.idle_resets.load(Ordering::Relaxed),
            interruptions: self.interruptions.load(Ordering::Relaxed),
        }
    }
}
