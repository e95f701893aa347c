//! In-memory backing store.
//!
//! All connections created by one [`InMemorySupplier`] share the same
//! [`InMemoryStore`], so rows survive a reconnect the way rows in a file or a
//! server would. Used by unit and integration tests.

use crate::domain::{ConnectionError, RowId, StoreError};
use crate::ports::outbound::{Connection, ConnectionSupplier};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Table {
    next_id: RowId,
    rows: BTreeMap<RowId, Vec<u8>>,
}

/// Shared in-process row storage.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<HashMap<String, Table>>,
    failing_writes: AtomicUsize,
    unreachable: AtomicBool,
    connections_opened: AtomicU64,
    batches_written: AtomicU64,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` batch inserts fail with a database error.
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Make new connections fail as if the store were offline.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Number of connections opened so far.
    pub fn connections_opened(&self) -> u64 {
        self.connections_opened.load(Ordering::SeqCst)
    }

    /// Number of successful batch inserts.
    pub fn batches_written(&self) -> u64 {
        self.batches_written.load(Ordering::SeqCst)
    }

    /// Number of rows in `table`, zero if it does not exist.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.lock().get(table).map_or(0, |t| t.rows.len())
    }

    fn take_write_failure(&self) -> bool {
        self.failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// Supplier handing out connections to one shared [`InMemoryStore`].
#[derive(Clone, Default)]
pub struct InMemorySupplier {
    store: Arc<InMemoryStore>,
}

impl InMemorySupplier {
    /// Create a supplier over a fresh store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a supplier over an existing store.
    pub fn with_store(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }

    /// The backing store.
    pub fn store(&self) -> Arc<InMemoryStore> {
        Arc::clone(&self.store)
    }
}

#[async_trait]
impl ConnectionSupplier for InMemorySupplier {
    async fn create_connection(&self) -> Result<Arc<dyn Connection>, ConnectionError> {
        if self.store.unreachable.load(Ordering::SeqCst) {
            return Err(ConnectionError::Unreachable {
                target: self.target(),
                message: "store marked unreachable".to_string(),
            });
        }
        let serial = self.store.connections_opened.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Arc::new(InMemoryConnection {
            store: Arc::clone(&self.store),
            serial,
            closed: AtomicBool::new(false),
        }))
    }

    fn target(&self) -> String {
        "memory".to_string()
    }
}

/// One session with an [`InMemoryStore`].
pub struct InMemoryConnection {
    store: Arc<InMemoryStore>,
    serial: u64,
    closed: AtomicBool,
}

impl InMemoryConnection {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for InMemoryConnection {
    async fn create_table_if_not_exists(&self, table: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.store
            .tables
            .lock()
            .entry(table.to_string())
            .or_insert_with(|| Table {
                next_id: 1,
                rows: BTreeMap::new(),
            });
        Ok(())
    }

    async fn insert_batch(
        &self,
        table: &str,
        payloads: Vec<Vec<u8>>,
    ) -> Result<Vec<RowId>, StoreError> {
        self.ensure_open()?;
        if self.store.take_write_failure() {
            return Err(StoreError::Database {
                message: "injected write failure".to_string(),
            });
        }

        let mut tables = self.store.tables.lock();
        let entry = tables.get_mut(table).ok_or_else(|| StoreError::TableMissing {
            table: table.to_string(),
        })?;

        let mut ids = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let id = entry.next_id;
            entry.next_id += 1;
            entry.rows.insert(id, payload);
            ids.push(id);
        }
        self.store.batches_written.fetch_add(1, Ordering::SeqCst);
        Ok(ids)
    }

    async fn query_all(&self, table: &str) -> Result<Vec<(RowId, Vec<u8>)>, StoreError> {
        self.ensure_open()?;
        let tables = self.store.tables.lock();
        let entry = tables.get(table).ok_or_else(|| StoreError::TableMissing {
            table: table.to_string(),
        })?;
        Ok(entry.rows.iter().map(|(id, p)| (*id, p.clone())).collect())
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("memory#{}", self.serial)
    }
}
