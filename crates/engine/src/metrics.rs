//! Session metrics tracker
//!
//! Counters with no business logic. Session duration advances through a
//! once-a-second ticker task, stopped via a watch channel on teardown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;

use giftwise_core::MetricsSnapshot;

#[derive(Default)]
pub struct MetricsTracker {
    message_count: AtomicU64,
    last_response_secs: RwLock<f64>,
    session_duration_secs: AtomicU64,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one transcript message
    pub fn record_message(&self) {
        self.message_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the wall-clock delay of the latest assistant response
    pub fn record_latency(&self, elapsed: Duration) {
        *self.last_response_secs.write() = elapsed.as_secs_f64();
    }

    /// Advance the session duration by one second
    pub fn tick(&self) {
        self.session_duration_secs.fetch_add(1, Ordering::Relaxed);
    }

    /// Zero every counter
    pub fn reset(&self) {
        self.message_count.store(0, Ordering::Relaxed);
        *self.last_response_secs.write() = 0.0;
        self.session_duration_secs.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            message_count: self.message_count.load(Ordering::Relaxed),
            last_response_secs: *self.last_response_secs.read(),
            session_duration_secs: self.session_duration_secs.load(Ordering::Relaxed),
        }
    }

    /// Start the duration ticker. Returns the shutdown handle; sending
    /// `true` (or dropping the handle) stops the task.
    pub fn start_ticker(self: Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let tracker = self;

        tokio::spawn(async move {
            let period = Duration::from_secs(1);
            let mut interval =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval.tick() => tracker.tick(),
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            tracing::debug!("Metrics ticker shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }
}
