//! # Write Consumer (bl-02)
//!
//! Adaptive batching write-consumer. Many producers push items; one
//! long-lived loop drains them and persists them in batches, trading write
//! latency for throughput.
//!
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Rate Adaptation
//!
//! | Tick observation | Action |
//! |------------------|--------|
//! | depth >= threshold | drain + write; halve interval if depth/threshold > overload factor |
//! | depth < threshold | idle tick; reset interval after more than N idle ticks in a row |
//!
//! ## Module Structure
//!
//! ```text
//! bl-02-write-consumer/
//! ├── config.rs     # ConsumerConfig, WriteFailurePolicy
//! ├── domain/       # IntakeQueue, PollGovernor, ConsumerStats, errors
//! ├── ports/        # ItemSink (in), BatchWriter + TaskSpawner (out)
//! ├── adapters/     # Storage-backed and recording writers, tokio spawner
//! └── service/      # WriteConsumer and its flush loop
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use bl_02_write_consumer::{ConsumerConfig, TokioSpawner, WriteConsumer};
//!
//! let consumer = Arc::new(WriteConsumer::<Sample, _>::for_storage(
//!     access,
//!     ConsumerConfig::default(),
//! )?);
//! let handle = consumer.kick_off(&TokioSpawner::current());
//!
//! consumer.enqueue(sample);
//!
//! consumer.stop();
//! handle.await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{RecordingBatchWriter, StorageBatchWriter, TokioSpawner};
pub use config::{ConsumerConfig, WriteFailurePolicy};
pub use domain::{
    ConsumerError, ConsumerStats, IntakeQueue, PollGovernor, StatsSnapshot, TickDecision,
};
pub use ports::{BatchWriter, ItemSink, TaskSpawner};
pub use service::{FlushTrigger, WriteConsumer};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
