//! # Ports Module
//!
//! Outbound ports implemented by backing-store adapters.

pub mod outbound;

pub use outbound::*;
