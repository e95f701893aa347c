//! # Inbound Port - ItemSink
//!
//! What producers see of a consumer: a place to drop items that never
//! blocks and never fails.

/// Accepts items for later persistence.
pub trait ItemSink<T>: Send + Sync {
    /// Queue one item.
    fn enqueue(&self, item: T);

    /// Queue several items, keeping their order.
    fn enqueue_all(&self, items: Vec<T>) {
        for item in items {
            self.enqueue(item);
        }
    }
}
