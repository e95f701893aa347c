//! Shared test fixtures.

use bl_01_storage_access::{ConnectionSupplier, Entity, StorageAccess};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Sensor reading persisted by the integration tests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Sequence number assigned by the producer
    pub seq: u32,
    /// Sensor identifier
    pub sensor: String,
    /// Measured value
    pub value: f64,
}

impl Entity for Reading {
    const TABLE: &'static str = "readings";
}

/// `count` readings with sequence numbers starting at `from`.
pub fn readings(from: u32, count: u32) -> Vec<Reading> {
    (from..from + count)
        .map(|seq| Reading {
            seq,
            sensor: format!("s-{}", seq % 7),
            value: f64::from(seq) * 0.5,
        })
        .collect()
}

/// Open a gateway over `supplier` with the readings table created.
pub async fn open_with_table(supplier: Arc<dyn ConnectionSupplier>) -> StorageAccess {
    let access = match StorageAccess::open(supplier).await {
        Ok(access) => access,
        Err(e) => panic!("failed to open storage: {e}"),
    };
    if let Err(e) = access.create_table_if_not_exists::<Reading>().await {
        panic!("failed to create table: {e}");
    }
    access
}

/// Write `value` as JSON to `dir/name`, returning the path.
pub fn write_json(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    if let Err(e) = std::fs::write(&path, value.to_string()) {
        panic!("failed to write {}: {e}", path.display());
    }
    path
}
