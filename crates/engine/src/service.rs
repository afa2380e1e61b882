//! The [`WebhookEngine`] service object.

use std::sync::Arc;

use hookrelay_db::WebhookStore;
use tokio::sync::broadcast;

use crate::config::EngineConfig;
use crate::executor::DeliveryExecutor;
use crate::outcome::DeliveryOutcome;
use crate::scheduler::RetryScheduler;

/// Buffer capacity for the terminal-outcome broadcast channel.
const OUTCOME_CHANNEL_CAPACITY: usize = 256;

/// The webhook delivery engine.
///
/// Owns the store handle, the outbound HTTP client, and the retry
/// timers. Constructed once at process start with an explicit store —
/// dependency-injected rather than a module-level global — and shared
/// via `Arc<WebhookEngine>`.
///
/// Subscription management lives in [`registry`](crate::registry);
/// emission and delivery in [`dispatcher`](crate::dispatcher).
pub struct WebhookEngine {
    pub(crate) store: Arc<dyn WebhookStore>,
    pub(crate) config: EngineConfig,
    pub(crate) executor: DeliveryExecutor,
    pub(crate) scheduler: Arc<RetryScheduler>,
    pub(crate) outcomes: broadcast::Sender<DeliveryOutcome>,
}

impl WebhookEngine {
    /// Create an engine against the given store and configuration.
    pub fn new(store: Arc<dyn WebhookStore>, config: EngineConfig) -> Self {
        let executor = DeliveryExecutor::new(&config);
        let (outcomes, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        Self {
            store,
            config,
            executor,
            scheduler: Arc::new(RetryScheduler::new()),
            outcomes,
        }
    }

    /// Subscribe to terminal delivery outcomes.
    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<DeliveryOutcome> {
        self.outcomes.subscribe()
    }

    /// Abort every outstanding retry timer without mutating delivery
    /// records. Intended for graceful shutdown.
    pub fn cancel_all_pending(&self) {
        self.scheduler.cancel_all_pending();
    }

    /// Number of deliveries currently waiting on a retry timer.
    pub fn pending_retries(&self) -> usize {
        self.scheduler.pending()
    }
}
