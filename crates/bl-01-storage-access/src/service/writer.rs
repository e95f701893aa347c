//! Typed batch writer for one entity type.

use super::{ActiveConnection, StorageAccess};
use crate::domain::{Entity, RowId, StoreError, StoredRow};
use crate::ports::outbound::Connection;
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Writes and reads entities of type `T` through a [`StorageAccess`].
///
/// The writer is bound to one connection generation and rebinds itself
/// before each operation if the gateway has reconnected since.
pub struct EntityWriter<T: Entity> {
    access: StorageAccess,
    bound: Mutex<ActiveConnection>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> EntityWriter<T> {
    pub(crate) fn new(access: StorageAccess) -> Self {
        let bound = Mutex::new(access.active());
        Self {
            access,
            bound,
            _entity: PhantomData,
        }
    }

    /// Generation of the connection this writer is currently bound to.
    pub fn generation(&self) -> u64 {
        self.bound.lock().generation
    }

    fn connection(&self) -> Arc<dyn Connection> {
        let mut bound = self.bound.lock();
        let current = self.access.generation();
        if bound.generation != current {
            debug!(
                "[bl-01] Writer for '{}' rebinding from generation {} to {}",
                T::TABLE,
                bound.generation,
                current
            );
            *bound = self.access.active();
        }
        Arc::clone(&bound.connection)
    }

    /// Persist every item as one atomic batch, returning the assigned ids in
    /// input order. An empty slice is a no-op.
    pub async fn persist_all(&self, items: &[T]) -> Result<Vec<RowId>, StoreError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let payloads = items
            .iter()
            .map(T::encode)
            .collect::<Result<Vec<_>, _>>()?;
        self.connection().insert_batch(T::TABLE, payloads).await
    }

    /// Read every stored row of `T` in id order.
    pub async fn query_all(&self) -> Result<Vec<StoredRow<T>>, StoreError> {
        let rows = self.connection().query_all(T::TABLE).await?;
        rows.into_iter()
            .map(|(id, payload)| {
                Ok(StoredRow {
                    id,
                    entity: T::decode(&payload)?,
                })
            })
            .collect()
    }

    /// Number of stored rows of `T`.
    pub async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.connection().query_all(T::TABLE).await?.len())
    }
}
