//! Outbound (Driven) ports of the write consumer.

use async_trait::async_trait;
use bl_01_storage_access::StoreError;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;

/// Persists a batch of items as one unit.
///
/// A call either stores every item or fails; the consumer never splits a
/// batch across calls.
#[async_trait]
pub trait BatchWriter<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Persist `items` in order.
    async fn persist_all(&self, items: &[T]) -> Result<(), StoreError>;

    /// Label for logs and metrics, usually the destination table.
    fn label(&self) -> &str {
        "batch"
    }
}

/// Something that can host a long-lived task.
///
/// Passed to [`WriteConsumer::kick_off`](crate::WriteConsumer::kick_off)
/// instead of reaching for a process-wide pool.
pub trait TaskSpawner: Send + Sync {
    /// Run `task` until it completes.
    fn spawn_long_lived(&self, name: &str, task: BoxFuture<'static, ()>) -> JoinHandle<()>;
}
