//! # Telemetry
//!
//! A running consumer shows up in the exported Prometheus text.

#[cfg(test)]
mod tests {
    use bl_02_write_consumer::{ConsumerConfig, RecordingBatchWriter, WriteConsumer};
    use bl_telemetry::{gather_metrics, init_test_logging, register_metrics};

    #[tokio::test]
    async fn test_flush_is_exported_as_metrics() {
        init_test_logging();
        register_metrics().unwrap();

        let consumer =
            WriteConsumer::new(RecordingBatchWriter::<u64>::new(), ConsumerConfig::for_testing())
                .unwrap();
        consumer.enqueue_all(0..10);
        assert_eq!(consumer.flush().await.unwrap(), 10);

        let text = gather_metrics().unwrap();
        assert!(text.contains("bl_consumer_batches_flushed_total"));
        assert!(text.contains("trigger=\"manual\""));
        assert!(text.contains("table=\"recording\""));
        assert!(text.contains("bl_consumer_flush_duration_seconds"));
    }
}
