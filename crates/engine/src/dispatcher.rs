//! Event emission and the per-delivery attempt loop.

use std::sync::Arc;

use futures::future::BoxFuture;
use hookrelay_core::backoff::retry_delay;
use hookrelay_core::types::EntityId;
use hookrelay_core::EventType;
use hookrelay_db::models::{AttemptOutcome, DeliveryStatus, WebhookDelivery, WebhookEventPayload};

use crate::error::EngineError;
use crate::executor::DeliveryJob;
use crate::outcome::DeliveryOutcome;
use crate::service::WebhookEngine;

impl WebhookEngine {
    /// Emit an event for an account, fanning out to every active
    /// subscription that wants it.
    ///
    /// Fire-and-forget: this creates one `pending` delivery record per
    /// matching subscription and spawns the delivery tasks, but never
    /// waits for (or reports) delivery results. Zero matches is a
    /// normal no-op. Only a failure of the subscription query itself —
    /// before any delivery exists — surfaces to the caller; a failure
    /// to create one subscriber's record skips that subscriber only.
    pub async fn emit(
        self: &Arc<Self>,
        owner_id: EntityId,
        event: EventType,
        data: serde_json::Value,
    ) -> Result<(), EngineError> {
        let subs = self
            .store
            .matching_subscriptions(owner_id, event.as_str())
            .await?;

        if subs.is_empty() {
            tracing::debug!(owner_id = %owner_id, event = %event, "No matching subscriptions");
            return Ok(());
        }

        // One payload per emission: every subscriber receives the
        // identical serialization, and retries reuse the same bytes.
        let payload = WebhookEventPayload {
            id: uuid::Uuid::new_v4(),
            event,
            timestamp: chrono::Utc::now(),
            data,
        };
        let payload_json = serde_json::to_value(&payload)?;
        let body = Arc::new(serde_json::to_string(&payload)?);

        tracing::info!(
            owner_id = %owner_id,
            event = %event,
            payload_id = %payload.id,
            subscriptions = subs.len(),
            "Dispatching event"
        );

        for sub in subs {
            let delivery = WebhookDelivery {
                id: uuid::Uuid::new_v4(),
                subscription_id: sub.id,
                event: event.as_str().to_string(),
                payload: payload_json.clone(),
                status: DeliveryStatus::Pending.as_str().to_string(),
                attempts: 0,
                last_attempt_at: None,
                response_code: None,
                response_body: None,
                error: None,
                created_at: chrono::Utc::now(),
                delivered_at: None,
            };

            if let Err(e) = self.store.insert_delivery(&delivery).await {
                tracing::error!(
                    subscription_id = %sub.id,
                    event = %event,
                    error = %e,
                    "Failed to create delivery record, skipping subscriber"
                );
                continue;
            }

            let job = DeliveryJob {
                delivery_id: delivery.id,
                subscription_id: sub.id,
                url: sub.url,
                secret: sub.secret,
                event,
                body: Arc::clone(&body),
                attempts: 0,
            };

            // Deliveries to different subscribers proceed independently;
            // one failing endpoint never blocks another's attempt.
            tokio::spawn(Arc::clone(self).run_attempt(job));
        }

        Ok(())
    }

    /// Run one attempt of a delivery, record its outcome, and either
    /// arm the next retry timer or publish the terminal outcome.
    ///
    /// Attempts of one delivery are strictly sequential: the next timer
    /// is armed only after this attempt's outcome is recorded.
    pub(crate) fn run_attempt(self: Arc<Self>, mut job: DeliveryJob) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            job.attempts += 1;
            let report = self.executor.execute(&job).await;
            let now = chrono::Utc::now();

            let status = if report.success {
                DeliveryStatus::Success
            } else if job.attempts >= self.config.max_retries {
                DeliveryStatus::Failed
            } else {
                DeliveryStatus::Pending
            };

            let outcome = AttemptOutcome {
                attempts: job.attempts,
                last_attempt_at: now,
                status,
                response_code: report.response_code,
                response_body: report.response_body,
                error: report.error,
                delivered_at: report.success.then_some(now),
            };

            // Best effort: a store failure here loses this attempt's
            // result but must not take down the delivery loop.
            if let Err(e) = self.store.record_attempt(job.delivery_id, &outcome).await {
                tracing::error!(
                    delivery_id = %job.delivery_id,
                    error = %e,
                    "Failed to record attempt outcome"
                );
            }

            match status {
                DeliveryStatus::Pending => {
                    let delay = retry_delay(self.config.base_delay, job.attempts);
                    tracing::warn!(
                        delivery_id = %job.delivery_id,
                        url = %job.url,
                        attempt = job.attempts,
                        retry_in_ms = delay.as_millis() as u64,
                        "Delivery attempt failed, retrying"
                    );
                    let engine = Arc::clone(&self);
                    self.scheduler
                        .schedule(job.delivery_id, delay, engine.run_attempt(job));
                }
                DeliveryStatus::Success => {
                    tracing::info!(
                        delivery_id = %job.delivery_id,
                        attempts = job.attempts,
                        "Delivery succeeded"
                    );
                    self.publish_outcome(&job, status);
                }
                DeliveryStatus::Failed => {
                    tracing::error!(
                        delivery_id = %job.delivery_id,
                        url = %job.url,
                        attempts = job.attempts,
                        "Delivery failed after all retries"
                    );
                    self.publish_outcome(&job, status);
                }
            }
        })
    }

    fn publish_outcome(&self, job: &DeliveryJob, status: DeliveryStatus) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.outcomes.send(DeliveryOutcome {
            delivery_id: job.delivery_id,
            subscription_id: job.subscription_id,
            event: job.event,
            status,
            attempts: job.attempts,
        });
    }
}
