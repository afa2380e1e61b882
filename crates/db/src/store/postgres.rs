//! Postgres-backed [`WebhookStore`] implementation.

use async_trait::async_trait;
use hookrelay_core::types::EntityId;
use sqlx::types::Json;

use crate::models::{AttemptOutcome, SubscriptionChanges, WebhookDelivery, WebhookSubscription};
use crate::store::{StoreError, WebhookStore};
use crate::DbPool;

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

const SUBSCRIPTION_COLUMNS: &str = "\
    id, owner_id, url, events, secret, is_active, metadata, \
    created_at, updated_at";

const DELIVERY_COLUMNS: &str = "\
    id, subscription_id, event, payload, status, attempts, \
    last_attempt_at, response_code, response_body, error, \
    created_at, delivered_at";

/// [`WebhookStore`] backed by the `webhook_subscriptions` and
/// `webhook_deliveries` tables.
pub struct PgWebhookStore {
    pool: DbPool,
}

impl PgWebhookStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WebhookStore for PgWebhookStore {
    async fn insert_subscription(&self, sub: &WebhookSubscription) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO webhook_subscriptions \
                 (id, owner_id, url, events, secret, is_active, metadata, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(sub.id)
        .bind(sub.owner_id)
        .bind(&sub.url)
        .bind(Json(&sub.events))
        .bind(&sub.secret)
        .bind(sub.is_active)
        .bind(&sub.metadata)
        .bind(sub.created_at)
        .bind(sub.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_subscription(
        &self,
        owner_id: EntityId,
        id: EntityId,
        changes: &SubscriptionChanges,
    ) -> Result<Option<WebhookSubscription>, StoreError> {
        let events_json = changes
            .events
            .as_ref()
            .map(|events| Json(events.iter().map(|e| e.as_str().to_string()).collect::<Vec<_>>()));

        let query = format!(
            "UPDATE webhook_subscriptions SET \
                 url = COALESCE($3, url), \
                 events = COALESCE($4, events), \
                 is_active = COALESCE($5, is_active), \
                 metadata = COALESCE($6, metadata), \
                 updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {SUBSCRIPTION_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, WebhookSubscription>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(changes.url.as_deref())
            .bind(events_json)
            .bind(changes.is_active)
            .bind(changes.metadata.as_ref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_subscription(
        &self,
        owner_id: EntityId,
        id: EntityId,
    ) -> Result<bool, StoreError> {
        let result =
            sqlx::query("DELETE FROM webhook_subscriptions WHERE id = $1 AND owner_id = $2")
                .bind(id)
                .bind(owner_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_subscriptions(
        &self,
        owner_id: EntityId,
    ) -> Result<Vec<WebhookSubscription>, StoreError> {
        let query = format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM webhook_subscriptions \
             WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        let subs = sqlx::query_as::<_, WebhookSubscription>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(subs)
    }

    async fn find_subscription(
        &self,
        owner_id: EntityId,
        id: EntityId,
    ) -> Result<Option<WebhookSubscription>, StoreError> {
        let query = format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM webhook_subscriptions \
             WHERE id = $1 AND owner_id = $2"
        );
        let sub = sqlx::query_as::<_, WebhookSubscription>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sub)
    }

    async fn matching_subscriptions(
        &self,
        owner_id: EntityId,
        event: &str,
    ) -> Result<Vec<WebhookSubscription>, StoreError> {
        // `events` is a JSONB array of wire names; containment of a
        // one-element array matches subscriptions holding that event.
        let query = format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM webhook_subscriptions \
             WHERE owner_id = $1 \
               AND is_active = TRUE \
               AND events @> jsonb_build_array($2::text)"
        );
        let subs = sqlx::query_as::<_, WebhookSubscription>(&query)
            .bind(owner_id)
            .bind(event)
            .fetch_all(&self.pool)
            .await?;
        Ok(subs)
    }

    async fn insert_delivery(&self, delivery: &WebhookDelivery) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO webhook_deliveries \
                 (id, subscription_id, event, payload, status, attempts, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(delivery.id)
        .bind(delivery.subscription_id)
        .bind(&delivery.event)
        .bind(&delivery.payload)
        .bind(&delivery.status)
        .bind(delivery.attempts)
        .bind(delivery.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_attempt(
        &self,
        delivery_id: EntityId,
        outcome: &AttemptOutcome,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE webhook_deliveries SET \
                 status = $2, \
                 attempts = $3, \
                 last_attempt_at = $4, \
                 response_code = $5, \
                 response_body = $6, \
                 error = $7, \
                 delivered_at = $8 \
             WHERE id = $1",
        )
        .bind(delivery_id)
        .bind(outcome.status.as_str())
        .bind(outcome.attempts)
        .bind(outcome.last_attempt_at)
        .bind(outcome.response_code)
        .bind(outcome.response_body.as_deref())
        .bind(outcome.error.as_deref())
        .bind(outcome.delivered_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_deliveries(
        &self,
        subscription_id: EntityId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WebhookDelivery>, StoreError> {
        let query = format!(
            "SELECT {DELIVERY_COLUMNS} FROM webhook_deliveries \
             WHERE subscription_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        let deliveries = sqlx::query_as::<_, WebhookDelivery>(&query)
            .bind(subscription_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(deliveries)
    }

    async fn find_delivery(&self, id: EntityId) -> Result<Option<WebhookDelivery>, StoreError> {
        let query = format!("SELECT {DELIVERY_COLUMNS} FROM webhook_deliveries WHERE id = $1");
        let delivery = sqlx::query_as::<_, WebhookDelivery>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(delivery)
    }
}
