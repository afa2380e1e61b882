//! The store seam between the delivery engine and persistence.
//!
//! [`WebhookStore`] abstracts the two logical tables (subscriptions and
//! deliveries) so the engine can run against Postgres in production and
//! an in-memory fake in tests. The engine receives the store as an
//! explicit `Arc<dyn WebhookStore>` at construction — there is no
//! lazily-initialized global.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use hookrelay_core::types::EntityId;

use crate::models::{AttemptOutcome, SubscriptionChanges, WebhookDelivery, WebhookSubscription};

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence operations needed by the delivery engine.
///
/// Id and timestamp generation happens in the caller; implementations
/// only persist what they are given so both backends behave identically.
#[async_trait]
pub trait WebhookStore: Send + Sync {
    // -- Subscriptions ------------------------------------------------------

    /// Persist a fully-constructed subscription.
    async fn insert_subscription(&self, sub: &WebhookSubscription) -> Result<(), StoreError>;

    /// Apply partial changes to an owner's subscription.
    ///
    /// Returns the updated row, or `None` when the id does not exist for
    /// that owner. The secret is never touched.
    async fn update_subscription(
        &self,
        owner_id: EntityId,
        id: EntityId,
        changes: &SubscriptionChanges,
    ) -> Result<Option<WebhookSubscription>, StoreError>;

    /// Delete an owner's subscription. Returns whether a row was removed.
    async fn delete_subscription(&self, owner_id: EntityId, id: EntityId)
        -> Result<bool, StoreError>;

    /// All subscriptions of an owner, newest first.
    async fn list_subscriptions(
        &self,
        owner_id: EntityId,
    ) -> Result<Vec<WebhookSubscription>, StoreError>;

    /// Find one subscription of an owner.
    async fn find_subscription(
        &self,
        owner_id: EntityId,
        id: EntityId,
    ) -> Result<Option<WebhookSubscription>, StoreError>;

    /// Active subscriptions of an owner whose event set contains `event`.
    async fn matching_subscriptions(
        &self,
        owner_id: EntityId,
        event: &str,
    ) -> Result<Vec<WebhookSubscription>, StoreError>;

    // -- Deliveries ---------------------------------------------------------

    /// Persist a fully-constructed delivery record (status `pending`).
    async fn insert_delivery(&self, delivery: &WebhookDelivery) -> Result<(), StoreError>;

    /// Record the outcome of one delivery attempt.
    async fn record_attempt(
        &self,
        delivery_id: EntityId,
        outcome: &AttemptOutcome,
    ) -> Result<(), StoreError>;

    /// Delivery history for a subscription, newest first.
    async fn list_deliveries(
        &self,
        subscription_id: EntityId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WebhookDelivery>, StoreError>;

    /// Find a delivery by id.
    async fn find_delivery(&self, id: EntityId) -> Result<Option<WebhookDelivery>, StoreError>;
}
