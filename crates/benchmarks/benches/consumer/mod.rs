//! Consumer benchmark modules.
//!
//! - `intake_queue` - raw queue operations, single and multi producer
//! - `heavy_consumer` - full pipeline into in-memory and RocksDB stores

pub mod heavy_consumer;
pub mod intake_queue;
