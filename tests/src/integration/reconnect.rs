//! # Reconnect Under Load
//!
//! The gateway reconnects while a consumer keeps flushing; batches after the
//! reconnect go to the new connection without any action from the consumer.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{open_with_table, readings, Reading};
    use bl_01_storage_access::{InMemorySupplier, StorageAccess};
    use bl_02_write_consumer::{ConsumerConfig, TokioSpawner, WriteConsumer};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::sleep;

    async fn running_consumer(
        access: StorageAccess,
    ) -> (
        Arc<WriteConsumer<Reading, bl_02_write_consumer::StorageBatchWriter<Reading>>>,
        tokio::task::JoinHandle<()>,
    ) {
        let consumer = Arc::new(
            WriteConsumer::for_storage(access, ConsumerConfig::for_testing()).unwrap(),
        );
        let handle = consumer.kick_off(&TokioSpawner::current());
        (consumer, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn test_flushes_follow_reconnect() {
        let supplier = InMemorySupplier::new();
        let access = open_with_table(Arc::new(supplier.clone())).await;
        let (consumer, handle) = running_consumer(access.clone()).await;

        consumer.enqueue_all(readings(0, 4));
        sleep(Duration::from_millis(5)).await;
        assert_eq!(access.generation(), 1);

        access.reconnect().await.unwrap();
        assert_eq!(access.generation(), 2);

        consumer.enqueue_all(readings(4, 4));
        sleep(Duration::from_millis(10)).await;
        consumer.stop();
        handle.await.unwrap();

        assert_eq!(consumer.stats().failed_batches, 0);
        assert_eq!(supplier.store().row_count("readings"), 8);
        assert_eq!(supplier.store().connections_opened(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_with_new_supplier_redirects_writes() {
        let first = InMemorySupplier::new();
        let second = InMemorySupplier::new();
        let access = open_with_table(Arc::new(first.clone())).await;
        let (consumer, handle) = running_consumer(access.clone()).await;

        consumer.enqueue_all(readings(0, 4));
        sleep(Duration::from_millis(5)).await;

        access.reconnect_with(Arc::new(second.clone())).await.unwrap();
        access.create_table_if_not_exists::<Reading>().await.unwrap();

        consumer.enqueue_all(readings(4, 6));
        sleep(Duration::from_millis(10)).await;
        consumer.stop();
        handle.await.unwrap();

        assert_eq!(first.store().row_count("readings"), 4);
        assert_eq!(second.store().row_count("readings"), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reconnect_is_reported_to_caller_only() {
        let supplier = InMemorySupplier::new();
        let access = open_with_table(Arc::new(supplier.clone())).await;
        let (consumer, handle) = running_consumer(access.clone()).await;

        supplier.store().set_unreachable(true);
        assert!(access.reconnect().await.is_err());
        assert!(consumer.is_running());

        // The old handle was closed, so this batch fails and is discarded.
        consumer.enqueue_all(readings(0, 4));
        sleep(Duration::from_millis(5)).await;
        assert_eq!(consumer.stats().failed_batches, 1);

        supplier.store().set_unreachable(false);
        access.reconnect().await.unwrap();
        consumer.enqueue_all(readings(4, 4));
        consumer.stop();
        handle.await.unwrap();

        assert_eq!(supplier.store().row_count("readings"), 4);
    }
}
