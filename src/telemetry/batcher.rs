use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::sink::EventSink;
use crate::config::RuntimeMode;
use crate::metrics::{BATCHES_DELIVERED, BATCHES_DROPPED, EVENTS_DROPPED, EVENTS_TRACKED};
use crate::models::QueuedEvent;

#[derive(Debug, Clone, Copy)]
pub struct BatcherConfig {
    pub batch_size: usize,
    pub flush_delay: Duration,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            flush_delay: Duration::from_millis(100),
        }
    }
}

/// In-memory telemetry queue flushed in bounded batches.
///
/// Producers append with [`EventBatcher::track`] at any time. Flushing is
/// single-flight: at most one batch is in transit, and batches leave the
/// queue in FIFO order. A batch whose delivery fails is dropped.
pub struct EventBatcher {
    queue: Mutex<VecDeque<QueuedEvent>>,
    flushing: AtomicBool,
    scheduled: AtomicBool,
    sink: Arc<dyn EventSink>,
    mode: RuntimeMode,
    config: BatcherConfig,
    shutdown: CancellationToken,
}

impl EventBatcher {
    pub fn new(sink: Arc<dyn EventSink>, mode: RuntimeMode, config: BatcherConfig) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(VecDeque::new()),
            flushing: AtomicBool::new(false),
            scheduled: AtomicBool::new(false),
            sink,
            mode,
            config,
            shutdown: CancellationToken::new(),
        })
    }

    // Queue an event and make sure a flush is coming. Never fails
    pub fn track(self: &Arc<Self>, page: &str, event: &str, metadata: Map<String, Value>) {
        let queued = QueuedEvent {
            page: page.to_string(),
            event: event.to_string(),
            metadata,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        self.queue.lock().push_back(queued);
        EVENTS_TRACKED.inc();

        self.schedule_flush();
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    fn schedule_flush(self: &Arc<Self>) {
        if self.shutdown.is_cancelled() {
            return;
        }
        // one timer at a time
        if self.scheduled.swap(true, Ordering::SeqCst) {
            return;
        }

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                self.scheduled.store(false, Ordering::SeqCst);
                warn!(pending = self.pending(), "No async runtime, telemetry flush not scheduled");
                return;
            }
        };

        let batcher = Arc::clone(self);
        handle.spawn(async move {
            tokio::select! {
                _ = batcher.shutdown.cancelled() => {
                    batcher.scheduled.store(false, Ordering::SeqCst);
                }
                _ = sleep(batcher.config.flush_delay) => {
                    batcher.scheduled.store(false, Ordering::SeqCst);
                    batcher.flush().await;
                }
            }
        });
    }

    /// Send up to `batch_size` events from the head of the queue.
    ///
    /// Returns the number of events taken off the queue; 0 when the queue was
    /// empty or another flush is already running.
    pub async fn flush(self: &Arc<Self>) -> usize {
        if self
            .flushing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return 0;
        }

        let batch: Vec<QueuedEvent> = {
            let mut queue = self.queue.lock();
            let take = queue.len().min(self.config.batch_size);
            queue.drain(..take).collect()
        };
        let count = batch.len();

        if count > 0 {
            if self.mode.is_development() {
                debug!(count, events = ?batch, "Telemetry batch (development, not sent)");
            } else {
                match self.sink.deliver(&batch).await {
                    Ok(()) => {
                        BATCHES_DELIVERED.inc();
                        debug!(count, "Telemetry batch delivered");
                    }
                    Err(e) => {
                        BATCHES_DROPPED.inc();
                        EVENTS_DROPPED.inc_by(count as f64);
                        warn!(error = %e, count, "Telemetry batch dropped");
                    }
                }
            }
        }

        self.flushing.store(false, Ordering::SeqCst);

        if self.pending() > 0 {
            self.schedule_flush();
        }
        count
    }

    // Flush until the queue is empty, used on shutdown
    pub async fn drain(self: &Arc<Self>) {
        while self.pending() > 0 {
            if self.flush().await == 0 {
                sleep(self.config.flush_delay).await;
            }
        }
    }

    // Cancel pending timers. Queued events stay until drained
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
