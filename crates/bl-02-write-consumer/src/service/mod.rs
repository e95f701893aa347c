//! # Write Consumer Service
//!
//! The adaptive batching write-consumer: producers push items into an
//! [`IntakeQueue`], a long-lived flush loop drains and persists them in
//! batches through a [`BatchWriter`].
//!
//! ## Flush Loop
//!
//! ```text
//! ┌──────────────┐  depth >= threshold  ┌────────────┐
//! │     Idle     │ ───────────────────► │  Flushing  │
//! │ (count tick) │ ◄─────────────────── │ (drain+put)│
//! └──────┬───────┘      write done      └────────────┘
//!        │ stop() / shutdown signal
//!        ▼
//! ┌──────────────┐
//! │   Stopped    │  final unconditional flush, then inert
//! └──────────────┘
//! ```
//!
//! The interval between ticks is driven by [`PollGovernor`]. The only
//! suspension point is the interval sleep, which `stop()` and the optional
//! shutdown signal both cut short.
//!
//! ## Write Failures
//!
//! A failed write never stops the loop. With [`WriteFailurePolicy::Discard`]
//! (the default) the batch is dropped and counted in the statistics; with
//! [`WriteFailurePolicy::Requeue`] it goes back to the head of the queue.
//!
//! No timeout is applied to the write itself; a hanging writer stalls the
//! loop. Wrap the writer if a bound is needed.

use crate::adapters::StorageBatchWriter;
use crate::config::{ConsumerConfig, WriteFailurePolicy};
use crate::domain::{
    ConsumerError, ConsumerStats, IntakeQueue, PollGovernor, StatsSnapshot, TickDecision,
};
use crate::ports::{BatchWriter, ItemSink, TaskSpawner};
use bl_01_storage_access::{Entity, StorageAccess};
use bl_telemetry::{
    metric_inc, metric_observe, metric_set, BATCHES_FLUSHED, FLUSH_DURATION, ITEMS_DISCARDED,
    ITEMS_PERSISTED, POLL_INTERVAL_MS, QUEUE_DEPTH, WRITE_FAILURES,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Upper bound on the loop buffer's initial capacity. The buffer still grows
/// past it when a drain needs more room.
const MAX_BUFFER_HINT: usize = 4096;

/// Why a batch was flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// Queue depth reached the threshold on a tick.
    Threshold,
    /// [`WriteConsumer::flush`] was called.
    Manual,
    /// Remainder flushed after the loop stopped.
    Final,
}

impl FlushTrigger {
    /// Metric label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlushTrigger::Threshold => "threshold",
            FlushTrigger::Manual => "manual",
            FlushTrigger::Final => "final",
        }
    }
}

/// Adaptive batching consumer for items of type `T`.
///
/// Construct it, wrap it in an [`Arc`], and either call
/// [`kick_off`](Self::kick_off) or drive [`run`](Self::run) yourself after
/// [`start`](Self::start).
pub struct WriteConsumer<T, W> {
    queue: IntakeQueue<T>,
    writer: W,
    config: ConsumerConfig,
    running: watch::Sender<bool>,
    poll_interval_nanos: AtomicU64,
    stats: ConsumerStats,
}

impl<T: Entity> WriteConsumer<T, StorageBatchWriter<T>> {
    /// Consumer writing into the table of `T` through `access`.
    pub fn for_storage(access: StorageAccess, config: ConsumerConfig) -> Result<Self, ConsumerError> {
        Self::new(StorageBatchWriter::new(access), config)
    }
}

impl<T, W> WriteConsumer<T, W>
where
    T: Send + Sync + 'static,
    W: BatchWriter<T>,
{
    /// Create a stopped consumer. Fails if `config` does not validate.
    pub fn new(writer: W, config: ConsumerConfig) -> Result<Self, ConsumerError> {
        config.validate()?;
        let (running, _) = watch::channel(false);
        Ok(Self {
            queue: IntakeQueue::new(),
            poll_interval_nanos: AtomicU64::new(duration_nanos(config.base_poll_interval)),
            writer,
            config,
            running,
            stats: ConsumerStats::default(),
        })
    }

    /// Queue one item for persistence. Never blocks, never fails.
    pub fn enqueue(&self, item: T) {
        self.queue.enqueue(item);
    }

    /// Queue several items in order.
    pub fn enqueue_all<I: IntoIterator<Item = T>>(&self, items: I) {
        self.queue.enqueue_all(items);
    }

    /// Current queue depth. Approximate while producers are active.
    pub fn queue_len(&self) -> usize {
        self.queue.current_size()
    }

    /// Arm the consumer. Does not spawn anything.
    pub fn start(&self) {
        if !self.running.send_replace(true) {
            info!("[bl-02] Consumer for '{}' started", self.writer.label());
        }
    }

    /// Ask the loop to stop. Returns immediately; await the loop's task to
    /// know when the final flush is done. Calling it again is a no-op.
    pub fn stop(&self) {
        if self.running.send_replace(false) {
            info!("[bl-02] Stop requested for '{}'", self.writer.label());
        }
    }

    /// Whether the consumer is armed.
    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    /// Interval the loop sleeps before its next tick.
    pub fn current_poll_interval(&self) -> Duration {
        Duration::from_nanos(self.poll_interval_nanos.load(Ordering::Relaxed))
    }

    /// Statistics so far.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Configuration in use.
    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// The batch writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Drain whatever is queued right now and persist it, regardless of the
    /// threshold. Safe to call while the loop runs: every item is drained by
    /// exactly one caller.
    ///
    /// Returns the number of items written; zero if the queue was empty.
    pub async fn flush(&self) -> Result<usize, ConsumerError> {
        let mut buffer = Vec::new();
        self.flush_into(&mut buffer, FlushTrigger::Manual).await
    }

    /// Run the flush loop until [`stop`](Self::stop) is called, then flush
    /// the remainder. Returns at once (after the remainder flush) if the
    /// consumer was not started.
    pub async fn run(&self) {
        self.run_loop(None).await;
    }

    /// Like [`run`](Self::run), but also stops when `shutdown` turns `true`
    /// or its sender is dropped.
    pub async fn run_with_shutdown(&self, shutdown: watch::Receiver<bool>) {
        self.run_loop(Some(shutdown)).await;
    }

    /// Start the consumer and run its loop on `spawner`.
    pub fn kick_off(self: &Arc<Self>, spawner: &dyn TaskSpawner) -> JoinHandle<()>
    where
        W: 'static,
    {
        self.start();
        let consumer = Arc::clone(self);
        let name = format!("bl-02-consumer-{}", self.writer.label());
        spawner.spawn_long_lived(&name, Box::pin(async move { consumer.run().await }))
    }

    async fn run_loop(&self, mut shutdown: Option<watch::Receiver<bool>>) {
        let label = self.writer.label();
        let mut running = self.running.subscribe();
        let mut governor = PollGovernor::new(&self.config);
        // Owned by this loop only; producers never see it.
        let mut buffer = Vec::with_capacity(self.config.flush_threshold.min(MAX_BUFFER_HINT));

        info!(
            "[bl-02] Flush loop for '{}' running (threshold {}, interval {:?})",
            label, self.config.flush_threshold, self.config.base_poll_interval
        );
        self.publish_interval(governor.current_interval());

        while observe_running(&mut running) {
            let depth = self.queue.current_size();
            metric_set!(QUEUE_DEPTH, &[label], depth);

            match governor.observe(depth) {
                TickDecision::Flush { halved } => {
                    if halved {
                        self.stats.record_halving();
                        debug!(
                            "[bl-02] '{}' overloaded ({} queued), poll interval now {:?}",
                            label,
                            depth,
                            governor.current_interval()
                        );
                    }
                    // Failures are logged and counted inside.
                    let _ = self.flush_into(&mut buffer, FlushTrigger::Threshold).await;
                }
                TickDecision::Idle { reset: true } => {
                    self.stats.record_idle_reset();
                    debug!(
                        "[bl-02] '{}' idle, poll interval reset to {:?}",
                        label,
                        governor.current_interval()
                    );
                }
                TickDecision::Idle { reset: false } => {}
            }

            let interval = governor.current_interval();
            self.publish_interval(interval);

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = running.changed() => {}
                _ = shutdown_requested(&mut shutdown) => {
                    warn!("[bl-02] Flush loop for '{}' interrupted, stopping", label);
                    self.stats.record_interruption();
                    self.stop();
                }
            }
        }

        if !self.queue.is_empty() {
            let _ = self.flush_into(&mut buffer, FlushTrigger::Final).await;
        }
        info!("[bl-02] Flush loop for '{}' stopped", label);
    }

    async fn flush_into(
        &self,
        buffer: &mut Vec<T>,
        trigger: FlushTrigger,
    ) -> Result<usize, ConsumerError> {
        let label = self.writer.label();
        self.queue.drain_all(buffer);
        if buffer.is_empty() {
            return Ok(0);
        }
        let count = buffer.len();

        let started = Instant::now();
        let result = self.writer.persist_all(buffer.as_slice()).await;
        metric_observe!(FLUSH_DURATION, &[label], started.elapsed().as_secs_f64());

        match result {
            Ok(()) => {
                buffer.clear();
                self.stats.record_flush(count);
                metric_inc!(BATCHES_FLUSHED, &[label, trigger.as_str()]);
                metric_inc!(ITEMS_PERSISTED, &[label], count);
                debug!(
                    "[bl-02] Flushed {} items to '{}' ({})",
                    count,
                    label,
                    trigger.as_str()
                );
                Ok(count)
            }
            Err(source) => {
                self.stats.record_failure();
                metric_inc!(WRITE_FAILURES, &[label]);
                match self.config.write_failure_policy {
                    WriteFailurePolicy::Discard => {
                        buffer.clear();
                        self.stats.record_discarded(count);
                        metric_inc!(ITEMS_DISCARDED, &[label], count);
                        warn!(
                            "[bl-02] Write of {} items to '{}' failed, batch discarded: {}",
                            count, label, source
                        );
                    }
                    WriteFailurePolicy::Requeue => {
                        self.queue.requeue_front(buffer.drain(..));
                        self.stats.record_requeued(count);
                        warn!(
                            "[bl-02] Write of {} items to '{}' failed, batch requeued: {}",
                            count, label, source
                        );
                    }
                }
                Err(ConsumerError::WriteFailed {
                    items: count,
                    source,
                })
            }
        }
    }

    fn publish_interval(&self, interval: Duration) {
        self.poll_interval_nanos
            .store(duration_nanos(interval), Ordering::Relaxed);
        metric_set!(
            POLL_INTERVAL_MS,
            &[self.writer.label()],
            interval.as_secs_f64() * 1_000.0
        );
    }
}

impl<T, W> ItemSink<T> for WriteConsumer<T, W>
where
    T: Send + Sync + 'static,
    W: BatchWriter<T>,
{
    fn enqueue(&self, item: T) {
        WriteConsumer::enqueue(self, item);
    }

    fn enqueue_all(&self, items: Vec<T>) {
        WriteConsumer::enqueue_all(self, items);
    }
}

/// Read the running flag and mark it seen, so `changed()` only wakes on a
/// later update.
fn observe_running(running: &mut watch::Receiver<bool>) -> bool {
    *running.borrow_and_update()
}

/// Resolves once shutdown is requested; never resolves without a receiver.
async fn shutdown_requested(shutdown: &mut Option<watch::Receiver<bool>>) {
    match shutdown {
        // A dropped sender also ends the wait.
        Some(rx) => {
            let _ = rx.wait_for(|stop| *stop).await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn duration_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
