//! Error types for the write consumer.

use bl_01_storage_access::StoreError;
use thiserror::Error;

/// Errors surfaced by the write consumer.
///
/// The flush loop never returns these; they reach callers only through
/// construction and manual [`flush`](crate::WriteConsumer::flush).
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// Configuration rejected at construction time.
    #[error("Invalid consumer configuration: {0}")]
    InvalidConfig(String),

    /// The batch writer failed to persist a drained batch.
    #[error("Failed to persist batch of {items} items: {source}")]
    WriteFailed {
        /// Number of items in the failed batch
        items: usize,
        /// Underlying store error
        #[source]
        source: StoreError,
    },
}
