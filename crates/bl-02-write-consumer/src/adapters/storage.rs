//! Batch writer backed by a [`StorageAccess`] gateway.

use crate::ports::BatchWriter;
use async_trait::async_trait;
use bl_01_storage_access::{Entity, StorageAccess, StoreError};
use std::marker::PhantomData;
use tracing::trace;

/// Persists batches of `T` into the entity's table.
///
/// A fresh [`EntityWriter`](bl_01_storage_access::EntityWriter) is taken
/// for every batch, so a reconnect of the gateway between two flushes is
/// picked up without any action from the consumer.
pub struct StorageBatchWriter<T: Entity> {
    access: StorageAccess,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> StorageBatchWriter<T> {
    /// Writer over `access`. The table of `T` must already exist.
    pub fn new(access: StorageAccess) -> Self {
        Self {
            access,
            _entity: PhantomData,
        }
    }

    /// The underlying gateway.
    pub fn access(&self) -> &StorageAccess {
        &self.access
    }
}

#[async_trait]
impl<T: Entity> BatchWriter<T> for StorageBatchWriter<T> {
    async fn persist_all(&self, items: &[T]) -> Result<(), StoreError> {
        let ids = self.access.writer::<T>().persist_all(items).await?;
        trace!(
            "[bl-02] Stored {} rows in '{}' (ids {:?}..={:?})",
            ids.len(),
            T::TABLE,
            ids.first(),
            ids.last()
        );
        Ok(())
    }

    fn label(&self) -> &str {
        T::TABLE
    }
}
