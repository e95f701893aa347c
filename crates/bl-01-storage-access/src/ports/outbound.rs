//! # Outbound Ports (Driven Ports)
//!
//! Interfaces a backing store must implement to be used by [`StorageAccess`].
//!
//! Production: `RocksDbSupplier` (file-backed), `MySqlSupplier` (networked)
//! Testing: `InMemorySupplier`
//!
//! [`StorageAccess`]: crate::service::StorageAccess

use crate::domain::{ConnectionError, RowId, StoreError};
use async_trait::async_trait;
use std::sync::Arc;

/// An open session with a backing store.
///
/// Implementations are internally synchronized and may be shared across
/// tasks behind an `Arc`.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Create the table if it does not exist yet.
    async fn create_table_if_not_exists(&self, table: &str) -> Result<(), StoreError>;

    /// Insert all payloads into `table` as one atomic unit.
    ///
    /// ## Atomicity Guarantee
    ///
    /// Either every payload is stored and one id per payload is returned in
    /// input order, or nothing is stored.
    async fn insert_batch(&self, table: &str, payloads: Vec<Vec<u8>>)
        -> Result<Vec<RowId>, StoreError>;

    /// Read every row of `table` in id order.
    async fn query_all(&self, table: &str) -> Result<Vec<(RowId, Vec<u8>)>, StoreError>;

    /// Close the session. Further operations fail with [`StoreError::Closed`].
    async fn close(&self) -> Result<(), StoreError>;

    /// Short description of the connection target, for logs.
    fn describe(&self) -> String;
}

/// Opens connections to a backing store.
#[async_trait]
pub trait ConnectionSupplier: Send + Sync {
    /// Create a connection.
    ///
    /// Must return a newly created connection on every call; the gateway
    /// relies on this to reconnect.
    async fn create_connection(&self) -> Result<Arc<dyn Connection>, ConnectionError>;

    /// Short description of the target, for logs.
    fn target(&self) -> String;
}
