//! # Batchline Telemetry
//!
//! Logging and metrics shared by the Batchline crates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bl_telemetry::{init_telemetry, TelemetryConfig};
//!
//! init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BL_SERVICE_NAME` | `batchline` | Service name in logs |
//! | `BL_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `BL_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `BL_JSON_LOGS` | `false` | JSON log lines (default on in containers) |

#![warn(missing_docs)]

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, init_test_logging};
pub use metrics::{
    gather_metrics, register_metrics, BATCHES_FLUSHED, FLUSH_DURATION, ITEMS_DISCARDED,
    ITEMS_PERSISTED, POLL_INTERVAL_MS, QUEUE_DEPTH, REGISTRY, WRITE_FAILURES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Metrics could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics and install the global log subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}

/// Increment a labelled counter.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
    ($metric:expr, $labels:expr, $by:expr) => {
        $metric.with_label_values($labels).inc_by($by as f64)
    };
}

/// Set a labelled gauge.
#[macro_export]
macro_rules! metric_set {
    ($metric:expr, $labels:expr, $value:expr) => {
        $metric.with_label_values($labels).set($value as f64)
    };
}

/// Record a labelled histogram observation.
#[macro_export]
macro_rules! metric_observe {
    ($metric:expr, $labels:expr, $value:expr) => {
        $metric.with_label_values($labels).observe($value)
    };
}
