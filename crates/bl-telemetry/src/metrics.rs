//! Prometheus metrics for Batchline consumers.
//!
//! All metrics follow the naming convention: `bl_<component>_<metric>_<unit>`
//! and carry a `table` label naming the entity table a consumer writes to.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Registry holding every Batchline metric
    pub static ref REGISTRY: Registry = Registry::new();

    /// Batches written, by trigger (threshold, manual, final)
    pub static ref BATCHES_FLUSHED: CounterVec = CounterVec::new(
        Opts::new("bl_consumer_batches_flushed_total", "Batches handed to the writer"),
        &["table", "trigger"]
    ).expect("metric creation failed");

    /// Items successfully persisted
    pub static ref ITEMS_PERSISTED: CounterVec = CounterVec::new(
        Opts::new("bl_consumer_items_persisted_total", "Items persisted by consumers"),
        &["table"]
    ).expect("metric creation failed");

    /// Failed batch writes
    pub static ref WRITE_FAILURES: CounterVec = CounterVec::new(
        Opts::new("bl_consumer_write_failures_total", "Batch writes that failed"),
        &["table"]
    ).expect("metric creation failed");

    /// Items dropped after a failed write
    pub static ref ITEMS_DISCARDED: CounterVec = CounterVec::new(
        Opts::new("bl_consumer_items_discarded_total", "Items discarded after a failed write"),
        &["table"]
    ).expect("metric creation failed");

    /// Queue depth observed at the last poll
    pub static ref QUEUE_DEPTH: GaugeVec = GaugeVec::new(
        Opts::new("bl_consumer_queue_depth", "Pending items observed at the last poll"),
        &["table"]
    ).expect("metric creation failed");

    /// Current poll interval
    pub static ref POLL_INTERVAL_MS: GaugeVec = GaugeVec::new(
        Opts::new("bl_consumer_poll_interval_milliseconds", "Current poll interval"),
        &["table"]
    ).expect("metric creation failed");

    /// Batch write latency
    pub static ref FLUSH_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "bl_consumer_flush_duration_seconds",
            "Time spent writing one batch"
        ).buckets(exponential_buckets(0.0001, 2.0, 16).expect("valid buckets")),
        &["table"]
    ).expect("metric creation failed");
}

/// Register every metric with [`REGISTRY`].
///
/// Calling this more than once is harmless.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(BATCHES_FLUSHED.clone()),
        Box::new(ITEMS_PERSISTED.clone()),
        Box::new(WRITE_FAILURES.clone()),
        Box::new(ITEMS_DISCARDED.clone()),
        Box::new(QUEUE_DEPTH.clone()),
        Box::new(POLL_INTERVAL_MS.clone()),
        Box::new(FLUSH_DURATION.clone()),
    ];
    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all registered metrics in the Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
