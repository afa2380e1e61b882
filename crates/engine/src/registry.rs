//! Subscription registry operations.

use hookrelay_core::secrets::generate_secret;
use hookrelay_core::types::EntityId;
use hookrelay_core::CoreError;
use hookrelay_db::models::{
    NewSubscription, SubscriptionChanges, WebhookDelivery, WebhookSubscription,
};
use url::Url;

use crate::error::EngineError;
use crate::service::WebhookEngine;

/// Default page size for delivery history.
const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Hard page-size cap for delivery history.
const MAX_HISTORY_LIMIT: i64 = 200;

impl WebhookEngine {
    /// Register a new webhook subscription for an account.
    ///
    /// Validates the URL and the (non-empty) event set, generates a
    /// signing secret when none is supplied, and persists the
    /// subscription active. The returned record is the only place the
    /// secret is ever exposed in full.
    pub async fn register_webhook(
        &self,
        owner_id: EntityId,
        input: NewSubscription,
    ) -> Result<WebhookSubscription, EngineError> {
        let url = validate_endpoint_url(&input.url)?;
        if input.events.is_empty() {
            return Err(CoreError::Validation("events must not be empty".into()).into());
        }

        let now = chrono::Utc::now();
        let sub = WebhookSubscription {
            id: uuid::Uuid::new_v4(),
            owner_id,
            url,
            events: input
                .events
                .iter()
                .map(|e| e.as_str().to_string())
                .collect(),
            secret: input.secret.unwrap_or_else(generate_secret),
            is_active: true,
            metadata: input
                .metadata
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            created_at: now,
            updated_at: now,
        };

        self.store.insert_subscription(&sub).await?;

        tracing::info!(
            subscription_id = %sub.id,
            owner_id = %owner_id,
            url = %sub.url,
            events = sub.events.len(),
            "Webhook subscription registered"
        );

        Ok(sub)
    }

    /// Update an account's subscription.
    ///
    /// Only `url`, `events`, `is_active`, and `metadata` can change; the
    /// secret is immutable after creation. Fails with `NotFound` when
    /// the id does not exist for that owner.
    pub async fn update_webhook(
        &self,
        owner_id: EntityId,
        id: EntityId,
        changes: SubscriptionChanges,
    ) -> Result<WebhookSubscription, EngineError> {
        if let Some(url) = &changes.url {
            validate_endpoint_url(url)?;
        }
        if let Some(events) = &changes.events {
            if events.is_empty() {
                return Err(CoreError::Validation("events must not be empty".into()).into());
            }
        }

        let updated = self
            .store
            .update_subscription(owner_id, id, &changes)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "WebhookSubscription",
                id,
            })?;

        tracing::info!(subscription_id = %id, owner_id = %owner_id, "Webhook subscription updated");

        Ok(updated)
    }

    /// Delete an account's subscription.
    ///
    /// Idempotent: deleting an id that no longer exists is a no-op, not
    /// an error. Existing delivery records are kept; they reference the
    /// subscription by id only.
    pub async fn delete_webhook(&self, owner_id: EntityId, id: EntityId) -> Result<(), EngineError> {
        let removed = self.store.delete_subscription(owner_id, id).await?;
        if removed {
            tracing::info!(subscription_id = %id, owner_id = %owner_id, "Webhook subscription deleted");
        } else {
            tracing::debug!(subscription_id = %id, "Delete matched no subscription");
        }
        Ok(())
    }

    /// All subscriptions of an account, newest first.
    pub async fn list_webhooks(
        &self,
        owner_id: EntityId,
    ) -> Result<Vec<WebhookSubscription>, EngineError> {
        Ok(self.store.list_subscriptions(owner_id).await?)
    }

    /// Delivery history for one of the account's subscriptions, newest
    /// first. Fails with `NotFound` for a foreign or unknown id.
    pub async fn get_delivery_history(
        &self,
        owner_id: EntityId,
        subscription_id: EntityId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<WebhookDelivery>, EngineError> {
        self.store
            .find_subscription(owner_id, subscription_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "WebhookSubscription",
                id: subscription_id,
            })?;

        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, MAX_HISTORY_LIMIT);
        let offset = offset.unwrap_or(0).max(0);

        Ok(self
            .store
            .list_deliveries(subscription_id, limit, offset)
            .await?)
    }
}

/// Validate and normalize a subscriber endpoint URL.
///
/// Only absolute http/https URLs are accepted.
fn validate_endpoint_url(raw: &str) -> Result<String, EngineError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| CoreError::Validation(format!("Invalid endpoint URL: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(CoreError::Validation(format!(
            "Endpoint URL must be http or https, got {}",
            url.scheme()
        ))
        .into());
    }

    Ok(url.to_string())
}
