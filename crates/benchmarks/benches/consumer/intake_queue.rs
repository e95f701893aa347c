//! # Intake Queue Benchmarks
//!
//! - Enqueue then drain of N items on one thread
//! - Four producers against a draining consumer

use bl_02_write_consumer::IntakeQueue;
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;

fn enqueue_then_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("bl-02/queue/enqueue_drain");

    for size in [1_000usize, 10_000, 100_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut buffer = Vec::with_capacity(size);
            b.iter(|| {
                let queue = IntakeQueue::new();
                for i in 0..size {
                    queue.enqueue(i);
                }
                buffer.clear();
                black_box(queue.drain_all(&mut buffer))
            })
        });
    }
    group.finish();
}

fn contended_producers(c: &mut Criterion) {
    let mut group = c.benchmark_group("bl-02/queue/contended");
    group.measurement_time(Duration::from_secs(10));

    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 25_000;
    group.throughput(Throughput::Elements((PRODUCERS * PER_PRODUCER) as u64));

    group.bench_function("4_producers_1_drainer", |b| {
        b.iter(|| {
            let queue = Arc::new(IntakeQueue::new());
            let producers: Vec<_> = (0..PRODUCERS)
                .map(|_| {
                    let queue = Arc::clone(&queue);
                    std::thread::spawn(move || {
                        for i in 0..PER_PRODUCER {
                            queue.enqueue(i);
                        }
                    })
                })
                .collect();

            let mut drained = Vec::with_capacity(PRODUCERS * PER_PRODUCER);
            while drained.len() < PRODUCERS * PER_PRODUCER {
                queue.drain_all(&mut drained);
            }
            for producer in producers {
                let _ = producer.join();
            }
            black_box(drained.len())
        })
    });
    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    enqueue_then_drain(c);
    contended_producers(c);
}
