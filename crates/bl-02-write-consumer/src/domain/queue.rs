//! # Intake Queue
//!
//! Unbounded multi-producer FIFO. Producers append without ever failing; the
//! consumer removes everything present in one atomic step.

use parking_lot::Mutex;
use std::collections::VecDeque;

/// Thread-safe unbounded FIFO of pending items.
pub struct IntakeQueue<T> {
    items: Mutex<VecDeque<T>>,
}

impl<T> Default for IntakeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntakeQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
        }
    }

    /// Append `item`. Never blocks beyond the critical section, never fails.
    pub fn enqueue(&self, item: T) {
        self.items.lock().push_back(item);
    }

    /// Append every item in order, under one lock acquisition.
    pub fn enqueue_all<I: IntoIterator<Item = T>>(&self, items: I) {
        self.items.lock().extend(items);
    }

    /// Instantaneous depth. Only a heuristic while producers are active.
    pub fn current_size(&self) -> usize {
        self.items.lock().len()
    }

    /// Whether the queue was empty at the instant of the call.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Move every item present right now to the end of `destination`,
    /// returning how many were moved. Items enqueued after the snapshot stay
    /// queued.
    pub fn drain_all(&self, destination: &mut Vec<T>) -> usize {
        let snapshot = std::mem::take(&mut *self.items.lock());
        let drained = snapshot.len();
        destination.extend(snapshot);
        drained
    }

    /// Put items back at the head of the queue, keeping their order ahead of
    /// anything enqueued since they were drained.
    pub fn requeue_front<I>(&self, items: I)
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: DoubleEndedIterator,
    {
        let mut queue = self.items.lock();
        for item in items.into_iter().rev() {
            queue.push_front(item);
        }
    }
}
