//! # RocksDB Storage Adapter
//!
//! File-backed implementation of the `Connection` port.
//!
//! ## Key Layout
//!
//! - `meta:<table>` - next row id (u64, big endian)
//! - `row:<table>:<id>` - row payload, id encoded big endian so a prefix scan
//!   returns rows in id order
//!
//! A batch insert is one `WriteBatch` containing every row plus the updated
//! id counter, so a batch is applied entirely or not at all.

use crate::config::FileStoreConfig;
use crate::domain::{ConfigError, ConnectionError, RowId, StoreError};
use crate::ports::outbound::{Connection, ConnectionSupplier};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const META_PREFIX: &str = "meta:";
const ROW_PREFIX: &str = "row:";

fn meta_key(table: &str) -> Vec<u8> {
    format!("{META_PREFIX}{table}").into_bytes()
}

fn row_prefix(table: &str) -> Vec<u8> {
    format!("{ROW_PREFIX}{table}:").into_bytes()
}

fn row_key(table: &str, id: RowId) -> Vec<u8> {
    let mut key = row_prefix(table);
    key.extend_from_slice(&id.to_be_bytes());
    key
}

fn db_error(err: rocksdb::Error) -> StoreError {
    StoreError::Database {
        message: err.to_string(),
    }
}

/// Supplier opening a RocksDB database at a fixed path.
#[derive(Clone, Debug)]
pub struct RocksDbSupplier {
    path: PathBuf,
}

impl RocksDbSupplier {
    /// Store at `path`; created on first connect if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store described by a `{ "file": ... }` config file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self::from(FileStoreConfig::from_file(path)?))
    }

    /// Database path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl From<FileStoreConfig> for RocksDbSupplier {
    fn from(config: FileStoreConfig) -> Self {
        Self::new(config.file)
    }
}

#[async_trait]
impl ConnectionSupplier for RocksDbSupplier {
    async fn create_connection(&self) -> Result<Arc<dyn Connection>, ConnectionError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let db = DB::open(&opts, &self.path).map_err(|e| ConnectionError::FileAccess {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!("[bl-01] Opened RocksDB at {}", self.path.display());

        Ok(Arc::new(RocksDbConnection {
            db: RwLock::new(Some(db)),
            insert_lock: Mutex::new(()),
            path: self.path.clone(),
        }))
    }

    fn target(&self) -> String {
        self.path.display().to_string()
    }
}

/// An open RocksDB database.
pub struct RocksDbConnection {
    db: RwLock<Option<DB>>,
    /// Serializes id allocation between concurrent inserts.
    insert_lock: Mutex<()>,
    path: PathBuf,
}

impl RocksDbConnection {
    fn next_id(db: &DB, table: &str) -> Result<Option<RowId>, StoreError> {
        let raw = db.get(meta_key(table)).map_err(db_error)?;
        match raw {
            None => Ok(None),
            Some(bytes) => {
                let arr: [u8; 8] = bytes.as_slice().try_into().map_err(|_| StoreError::Database {
                    message: format!("corrupt id counter for table '{table}'"),
                })?;
                Ok(Some(u64::from_be_bytes(arr)))
            }
        }
    }
}

#[async_trait]
impl Connection for RocksDbConnection {
    async fn create_table_if_not_exists(&self, table: &str) -> Result<(), StoreError> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(StoreError::Closed)?;
        let _insert = self.insert_lock.lock();
        if Self::next_id(db, table)?.is_none() {
            db.put(meta_key(table), 1u64.to_be_bytes()).map_err(db_error)?;
        }
        Ok(())
    }

    async fn insert_batch(
        &self,
        table: &str,
        payloads: Vec<Vec<u8>>,
    ) -> Result<Vec<RowId>, StoreError> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(StoreError::Closed)?;
        let _insert = self.insert_lock.lock();

        let first = Self::next_id(db, table)?.ok_or_else(|| StoreError::TableMissing {
            table: table.to_string(),
        })?;

        let mut batch = WriteBatch::default();
        let mut ids = Vec::with_capacity(payloads.len());
        let mut id = first;
        for payload in payloads {
            batch.put(row_key(table, id), payload);
            ids.push(id);
            id += 1;
        }
        batch.put(meta_key(table), id.to_be_bytes());
        db.write(batch).map_err(db_error)?;
        Ok(ids)
    }

    async fn query_all(&self, table: &str) -> Result<Vec<(RowId, Vec<u8>)>, StoreError> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(StoreError::Closed)?;
        if Self::next_id(db, table)?.is_none() {
            return Err(StoreError::TableMissing {
                table: table.to_string(),
            });
        }

        let prefix = row_prefix(table);
        let mut rows = Vec::new();
        for item in db.iterator(IteratorMode::From(&prefix, Direction::Forward)) {
            let (key, value) = item.map_err(db_error)?;
            if !key.starts_with(&prefix) {
                break;
            }
            let id_bytes: [u8; 8] =
                key[prefix.len()..]
                    .try_into()
                    .map_err(|_| StoreError::Database {
                        message: format!("corrupt row key in table '{table}'"),
                    })?;
            rows.push((u64::from_be_bytes(id_bytes), value.to_vec()));
        }
        Ok(rows)
    }

    async fn close(&self) -> Result<(), StoreError> {
        // Dropping the handle releases the database lock file.
        self.db.write().take();
        Ok(())
    }

    fn describe(&self) -> String {
        format!("rocksdb:{}", self.path.display())
    }
}
