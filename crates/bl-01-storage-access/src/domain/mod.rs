//! # Domain Module
//!
//! Entity contract and error types for storage access.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
