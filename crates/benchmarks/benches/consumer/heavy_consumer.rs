//! # Heavy Consumer Benchmarks
//!
//! Four producers push a stream of ticks into a running consumer; the
//! measurement ends once the consumer has stopped and every tick is stored.
//! Repeated for flush sizes 256, 128, 64 and 32 against the in-memory store
//! and against RocksDB.

use bl_01_storage_access::{InMemorySupplier, RocksDbSupplier, StorageAccess};
use bl_02_write_consumer::{ConsumerConfig, TokioSpawner, WriteConsumer};
use bl_benchmarks::utils::{generate_ticks, Tick};
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

const TICKS: usize = 20_000;
const PRODUCERS: usize = 4;
const FLUSH_SIZES: [usize; 4] = [256, 128, 64, 32];

async fn drive(access: StorageAccess, flush_size: usize, ticks: &[Tick]) -> usize {
    let config = ConsumerConfig::default()
        .with_flush_threshold(flush_size)
        .with_base_poll_interval(Duration::from_millis(5));
    let consumer = match WriteConsumer::<Tick, _>::for_storage(access.clone(), config) {
        Ok(consumer) => Arc::new(consumer),
        Err(e) => panic!("consumer config rejected: {e}"),
    };
    let handle = consumer.kick_off(&TokioSpawner::current());

    let chunk = ticks.len().div_ceil(PRODUCERS);
    let producers: Vec<_> = ticks
        .chunks(chunk)
        .map(|part| {
            let consumer = Arc::clone(&consumer);
            let part = part.to_vec();
            tokio::spawn(async move {
                for (i, tick) in part.into_iter().enumerate() {
                    consumer.enqueue(tick);
                    if i % 512 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            })
        })
        .collect();
    for producer in producers {
        let _ = producer.await;
    }

    consumer.stop();
    let _ = handle.await;
    consumer.stats().items_persisted as usize
}

fn heavy_in_memory(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let ticks = generate_ticks(TICKS);

    let mut group = c.benchmark_group("bl-02/heavy/memory");
    group.sample_size(20);
    group.throughput(Throughput::Elements(TICKS as u64));

    for flush_size in FLUSH_SIZES {
        group.bench_with_input(
            BenchmarkId::new("flush_size", flush_size),
            &flush_size,
            |b, &flush_size| {
                b.iter(|| {
                    runtime.block_on(async {
                        let access = StorageAccess::open(Arc::new(InMemorySupplier::new()))
                            .await
                            .expect("open in-memory store");
                        access
                            .create_table_if_not_exists::<Tick>()
                            .await
                            .expect("create table");
                        black_box(drive(access, flush_size, &ticks).await)
                    })
                })
            },
        );
    }
    group.finish();
}

fn heavy_rocksdb(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let ticks = generate_ticks(TICKS);

    let mut group = c.benchmark_group("bl-02/heavy/rocksdb");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));
    group.throughput(Throughput::Elements(TICKS as u64));

    for flush_size in FLUSH_SIZES {
        group.bench_with_input(
            BenchmarkId::new("flush_size", flush_size),
            &flush_size,
            |b, &flush_size| {
                b.iter(|| {
                    let dir = tempfile::tempdir().expect("temp dir");
                    runtime.block_on(async {
                        let supplier = RocksDbSupplier::new(dir.path().join("ticks"));
                        let access = StorageAccess::open(Arc::new(supplier))
                            .await
                            .expect("open rocksdb");
                        access
                            .create_table_if_not_exists::<Tick>()
                            .await
                            .expect("create table");
                        let persisted = drive(access.clone(), flush_size, &ticks).await;
                        access.close().await;
                        black_box(persisted)
                    })
                })
            },
        );
    }
    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    heavy_in_memory(c);
    heavy_rocksdb(c);
}
