//! Ports layer for the write consumer.
//!
//! - Inbound (Driving): [`ItemSink`] used by producers
//! - Outbound (Driven): [`BatchWriter`] and [`TaskSpawner`]

pub mod inbound;
pub mod outbound;

pub use inbound::ItemSink;
pub use outbound::{BatchWriter, TaskSpawner};
