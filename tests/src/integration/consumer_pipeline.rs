//! # Consumer Pipeline
//!
//! Producers -> WriteConsumer -> StorageBatchWriter -> StorageAccess -> store.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{open_with_table, readings, write_json, Reading};
    use bl_01_storage_access::{InMemorySupplier, RocksDbSupplier, StorageAccess};
    use bl_02_write_consumer::{
        ConsumerConfig, TokioSpawner, WriteConsumer, WriteFailurePolicy,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::sleep;

    fn config_32_50() -> ConsumerConfig {
        ConsumerConfig::default()
            .with_flush_threshold(32)
            .with_base_poll_interval(Duration::from_millis(50))
    }

    #[tokio::test(start_paused = true)]
    async fn test_hundred_readings_reach_the_store_in_order() {
        let supplier = InMemorySupplier::new();
        let access = open_with_table(Arc::new(supplier.clone())).await;
        let consumer = Arc::new(
            WriteConsumer::<Reading, _>::for_storage(access.clone(), config_32_50()).unwrap(),
        );
        let handle = consumer.kick_off(&TokioSpawner::current());

        for reading in readings(0, 100) {
            consumer.enqueue(reading);
        }
        sleep(Duration::from_millis(250)).await;
        assert_eq!(supplier.store().row_count("readings"), 100);

        consumer.stop();
        handle.await.unwrap();

        let rows = access.writer::<Reading>().query_all().await.unwrap();
        let stored: Vec<Reading> = rows.into_iter().map(|row| row.entity).collect();
        assert_eq!(stored, readings(0, 100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_failure_discards_batch_and_loop_survives() {
        let supplier = InMemorySupplier::new();
        let access = open_with_table(Arc::new(supplier.clone())).await;
        let consumer = Arc::new(
            WriteConsumer::<Reading, _>::for_storage(access, ConsumerConfig::for_testing())
                .unwrap(),
        );
        supplier.store().fail_next_writes(1);
        let handle = consumer.kick_off(&TokioSpawner::current());

        consumer.enqueue_all(readings(0, 4));
        sleep(Duration::from_millis(1)).await;
        consumer.enqueue_all(readings(4, 4));
        sleep(Duration::from_millis(15)).await;

        consumer.stop();
        handle.await.unwrap();

        let stats = consumer.stats();
        assert_eq!(stats.failed_batches, 1);
        assert_eq!(stats.items_discarded, 4);
        assert_eq!(stats.items_persisted, 4);
        assert_eq!(supplier.store().row_count("readings"), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requeue_policy_loses_nothing() {
        let supplier = InMemorySupplier::new();
        let access = open_with_table(Arc::new(supplier.clone())).await;
        let consumer = Arc::new(
            WriteConsumer::<Reading, _>::for_storage(
                access.clone(),
                ConsumerConfig::for_testing().with_write_failure_policy(WriteFailurePolicy::Requeue),
            )
            .unwrap(),
        );
        supplier.store().fail_next_writes(2);
        let handle = consumer.kick_off(&TokioSpawner::current());

        consumer.enqueue_all(readings(0, 10));
        sleep(Duration::from_millis(50)).await;
        consumer.stop();
        handle.await.unwrap();

        let stored: Vec<Reading> = access
            .writer::<Reading>()
            .query_all()
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.entity)
            .collect();
        assert_eq!(stored, readings(0, 10));
        assert_eq!(consumer.stats().failed_batches, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_rocksdb_store_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_json(
            dir.path(),
            "store.json",
            &serde_json::json!({ "file": dir.path().join("readings-db") }),
        );
        let supplier = RocksDbSupplier::from_config_file(&config_path).unwrap();
        let access = open_with_table(Arc::new(supplier.clone())).await;

        let consumer = Arc::new(
            WriteConsumer::<Reading, _>::for_storage(
                access.clone(),
                ConsumerConfig::default()
                    .with_flush_threshold(64)
                    .with_base_poll_interval(Duration::from_millis(5)),
            )
            .unwrap(),
        );
        let handle = consumer.kick_off(&TokioSpawner::current());

        let producers: Vec<_> = (0..4u32)
            .map(|p| {
                let consumer = Arc::clone(&consumer);
                tokio::spawn(async move {
                    for reading in readings(p * 250, 250) {
                        consumer.enqueue(reading);
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.await.unwrap();
        }
        consumer.stop();
        handle.await.unwrap();
        access.close().await;

        // A second gateway over the same files sees every row.
        let reopened = StorageAccess::open(Arc::new(supplier)).await.unwrap();
        let mut seqs: Vec<u32> = reopened
            .writer::<Reading>()
            .query_all()
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.entity.seq)
            .collect();
        assert_eq!(seqs.len(), 1_000);
        seqs.sort_unstable();
        assert_eq!(seqs, (0..1_000).collect::<Vec<_>>());
    }
}
