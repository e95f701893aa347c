//! # Adapters
//!
//! Backing-store implementations of the outbound ports.
//!
//! | Adapter | Store | Feature |
//! |---------|-------|---------|
//! | `memory` | shared in-process tables | always |
//! | `rocksdb` | local file-backed database | `rocksdb` (default) |
//! | `mysql` | networked MySQL server | `mysql` |

pub mod memory;
#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "rocksdb")]
pub mod rocksdb;

pub use memory::{InMemoryConnection, InMemoryStore, InMemorySupplier};
#[cfg(feature = "mysql")]
pub use mysql::{MySqlConnection, MySqlSupplier};
#[cfg(feature = "rocksdb")]
pub use self::rocksdb::{RocksDbConnection, RocksDbSupplier};
