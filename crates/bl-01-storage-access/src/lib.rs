//! # Storage Access (bl-01)
//!
//! Connection handling for the backing stores Batchline writes to.
//!
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! - Load connection parameters from JSON config files
//! - Open connections to a file-backed or networked store
//! - Expose a gateway that can close and reconnect, and that hands out typed
//!   writers which survive reconnects
//!
//! ## Module Structure
//!
//! ```text
//! bl-01-storage-access/
//! ├── config.rs     # JSON config loading (network and file stores)
//! ├── domain/       # Entity contract, row ids, errors
//! ├── ports/        # Connection + ConnectionSupplier traits
//! ├── adapters/     # In-memory, RocksDB, MySQL implementations
//! └── service/      # StorageAccess gateway + EntityWriter
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use bl_01_storage_access::{RocksDbSupplier, StorageAccess};
//!
//! let supplier = RocksDbSupplier::from_config_file("store.json")?;
//! let access = StorageAccess::open(Arc::new(supplier)).await?;
//! access.create_table_if_not_exists::<Sample>().await?;
//! access.writer::<Sample>().persist_all(&samples).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryConnection, InMemoryStore, InMemorySupplier};
#[cfg(feature = "mysql")]
pub use adapters::{MySqlConnection, MySqlSupplier};
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConnection, RocksDbSupplier};
pub use config::{FileStoreConfig, NetworkStoreConfig, DEFAULT_NETWORK_PORT};
pub use domain::{ConfigError, ConnectionError, Entity, RowId, StoreError, StoredRow};
pub use ports::{Connection, ConnectionSupplier};
pub use service::{EntityWriter, StorageAccess};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
