//! # Batchline Test Suite
//!
//! Cross-crate integration tests: the write consumer driving real storage
//! gateways.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs          # Shared entity + helpers
//!     ├── consumer_pipeline.rs # Consumer -> StorageAccess -> store
//!     ├── reconnect.rs         # Gateway reconnects under a running consumer
//!     ├── config_files.rs      # JSON config loading end to end
//!     └── telemetry.rs         # Metrics exported by a running consumer
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bl-tests
//! cargo test -p bl-tests integration::reconnect::
//! ```

pub mod integration;
