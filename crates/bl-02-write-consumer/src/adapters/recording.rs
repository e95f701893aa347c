//! In-process batch writer that keeps every batch it receives.
//!
//! Used by tests and benchmarks in place of a real store.

use crate::ports::BatchWriter;
use async_trait::async_trait;
use bl_01_storage_access::StoreError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Records batches in arrival order, with optional failure injection and
/// write latency.
pub struct RecordingBatchWriter<T> {
    batches: Mutex<Vec<Vec<T>>>,
    failing_writes: AtomicUsize,
    attempts: AtomicUsize,
    latency: Option<Duration>,
}

impl<T> Default for RecordingBatchWriter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordingBatchWriter<T> {
    /// Writer that keeps every batch.
    pub fn new() -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            failing_writes: AtomicUsize::new(0),
            attempts: AtomicUsize::new(0),
            latency: None,
        }
    }

    /// Sleep for `latency` inside every write.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail the next `count` writes.
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Write calls so far, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Sizes of the successful batches in arrival order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().iter().map(Vec::len).collect()
    }

    /// Total items across successful batches.
    pub fn total_items(&self) -> usize {
        self.batches.lock().iter().map(Vec::len).sum()
    }

    fn take_failure(&self) -> bool {
        self.failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl<T: Clone> RecordingBatchWriter<T> {
    /// Successful batches in arrival order.
    pub fn batches(&self) -> Vec<Vec<T>> {
        self.batches.lock().clone()
    }

    /// Every persisted item, batches concatenated.
    pub fn persisted(&self) -> Vec<T> {
        self.batches.lock().iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl<T> BatchWriter<T> for RecordingBatchWriter<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn persist_all(&self, items: &[T]) -> Result<(), StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.take_failure() {
            return Err(StoreError::Database {
                message: "injected write failure".to_string(),
            });
        }
        self.batches.lock().push(items.to_vec());
        Ok(())
    }

    fn label(&self) -> &str {
        "recording"
    }
}
