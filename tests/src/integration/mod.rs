//! Cross-crate integration tests.

pub mod fixtures;

mod config_files;
mod consumer_pipeline;
mod reconnect;
mod telemetry;
