//! # Storage Access Service
//!
//! The storage gateway: owns the live connection produced by a
//! [`ConnectionSupplier`], hands out typed writers and can reconnect.
//!
//! ## Connection Generations
//!
//! Every successful (re)connect bumps a generation counter. Writers remember
//! the generation they were bound to and rebind to the current connection
//! when it moves, so a writer obtained before a reconnect never keeps using
//! the closed handle.

mod writer;

pub use writer::EntityWriter;

use crate::domain::{ConnectionError, Entity, StoreError};
use crate::ports::outbound::{Connection, ConnectionSupplier};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Connection together with the generation it belongs to.
#[derive(Clone)]
pub(crate) struct ActiveConnection {
    pub(crate) connection: Arc<dyn Connection>,
    pub(crate) generation: u64,
}

struct AccessInner {
    supplier: RwLock<Arc<dyn ConnectionSupplier>>,
    active: RwLock<ActiveConnection>,
    /// Serializes reconnects; held across the supplier await.
    reconnect_lock: tokio::sync::Mutex<()>,
}

/// Storage gateway. Cheap to clone; clones share the same connection.
#[derive(Clone)]
pub struct StorageAccess {
    inner: Arc<AccessInner>,
}

impl StorageAccess {
    /// Open a connection through `supplier`.
    pub async fn open(supplier: Arc<dyn ConnectionSupplier>) -> Result<Self, ConnectionError> {
        let connection = supplier.create_connection().await?;
        info!(
            "[bl-01] Storage access opened: {}",
            connection.describe()
        );
        Ok(Self {
            inner: Arc::new(AccessInner {
                supplier: RwLock::new(supplier),
                active: RwLock::new(ActiveConnection {
                    connection,
                    generation: 1,
                }),
                reconnect_lock: tokio::sync::Mutex::new(()),
            }),
        })
    }

    /// Current connection handle.
    ///
    /// The handle is only valid for the current [`generation`](Self::generation);
    /// prefer [`writer`](Self::writer), which follows reconnects.
    pub fn connection(&self) -> Arc<dyn Connection> {
        Arc::clone(&self.inner.active.read().connection)
    }

    /// Current connection generation, starting at 1.
    pub fn generation(&self) -> u64 {
        self.inner.active.read().generation
    }

    pub(crate) fn active(&self) -> ActiveConnection {
        self.inner.active.read().clone()
    }

    /// Typed writer for entity `T`. The table must exist.
    pub fn writer<T: Entity>(&self) -> EntityWriter<T> {
        EntityWriter::new(self.clone())
    }

    /// Create the table of `T` if it does not exist.
    pub async fn create_table_if_not_exists<T: Entity>(&self) -> Result<(), StoreError> {
        self.connection().create_table_if_not_exists(T::TABLE).await
    }

    /// Close the current connection. Errors are logged, never returned.
    pub async fn close(&self) {
        let connection = self.connection();
        if let Err(e) = connection.close().await {
            warn!("[bl-01] Ignoring error while closing {}: {}", connection.describe(), e);
        }
    }

    /// Close the current connection and open a new one with the active supplier.
    pub async fn reconnect(&self) -> Result<(), ConnectionError> {
        self.reconnect_inner(None).await
    }

    /// Close the current connection and open a new one with `supplier`, which
    /// replaces the active supplier for future reconnects.
    pub async fn reconnect_with(&self, supplier: Arc<dyn ConnectionSupplier>) -> Result<(), ConnectionError> {
        self.reconnect_inner(Some(supplier)).await
    }

    async fn reconnect_inner(
        &self,
        new_supplier: Option<Arc<dyn ConnectionSupplier>>,
    ) -> Result<(), ConnectionError> {
        let _guard = self.inner.reconnect_lock.lock().await;

        self.close().await;
        if let Some(supplier) = new_supplier {
            debug!("[bl-01] Replacing connection supplier with {}", supplier.target());
            *self.inner.supplier.write() = supplier;
        }

        let supplier = Arc::clone(&*self.inner.supplier.read());
        let connection = supplier.create_connection().await?;

        let mut active = self.inner.active.write();
        active.generation += 1;
        info!(
            "[bl-01] Reconnected to {} (generation {})",
            connection.describe(),
            active.generation
        );
        active.connection = connection;
        Ok(())
    }
}
