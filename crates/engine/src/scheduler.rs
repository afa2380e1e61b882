//! In-process retry timers.
//!
//! Each pending retry is one tokio task sleeping until the backoff delay
//! elapses, keyed by delivery id so at most one timer exists per
//! delivery. Timers live only in process memory: a restart abandons all
//! pending retries (the delivery records keep their attempt counts, but
//! nothing re-arms them — a known durability gap).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use hookrelay_core::types::EntityId;
use tokio::task::JoinHandle;

/// Holds the outstanding retry timers of a [`WebhookEngine`](crate::WebhookEngine).
#[derive(Default)]
pub struct RetryScheduler {
    timers: Mutex<HashMap<EntityId, JoinHandle<()>>>,
}

impl RetryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer that runs `retry` after `delay`.
    ///
    /// Attempts for one delivery are sequential by construction, so an
    /// existing timer for the same id should not occur; if one does, it
    /// is aborted and replaced.
    pub(crate) fn schedule(
        self: &Arc<Self>,
        delivery_id: EntityId,
        delay: Duration,
        retry: BoxFuture<'static, ()>,
    ) {
        let scheduler = Arc::clone(self);

        // The lock is held across spawn and insert so the task's disarm
        // cannot run before the handle is in the map, even with a zero
        // delay.
        let mut timers = self.timers();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            scheduler.disarm(delivery_id);
            retry.await;
        });

        if let Some(stale) = timers.insert(delivery_id, handle) {
            tracing::warn!(%delivery_id, "Replacing an existing retry timer");
            stale.abort();
        }
    }

    /// Abort every outstanding timer without touching delivery records.
    ///
    /// Used at graceful shutdown so no timer callback fires on a
    /// terminating process.
    pub fn cancel_all_pending(&self) {
        let mut timers = self.timers();
        let cancelled = timers.len();
        for (_, handle) in timers.drain() {
            handle.abort();
        }
        if cancelled > 0 {
            tracing::info!(cancelled, "Cancelled pending retry timers");
        }
    }

    /// Number of outstanding retry timers.
    pub fn pending(&self) -> usize {
        self.timers().len()
    }

    fn disarm(&self, delivery_id: EntityId) {
        self.timers().remove(&delivery_id);
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<EntityId, JoinHandle<()>>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
