//! In-memory [`WebhookStore`] implementation.
//!
//! Behaviourally equivalent to the Postgres store from the engine's
//! point of view. Used by the test suites and suitable for embedded or
//! single-process deployments where durability is not required.

use std::collections::HashMap;

use async_trait::async_trait;
use hookrelay_core::types::EntityId;
use tokio::sync::RwLock;

use crate::models::{AttemptOutcome, SubscriptionChanges, WebhookDelivery, WebhookSubscription};
use crate::store::{StoreError, WebhookStore};

/// [`WebhookStore`] backed by in-process maps.
#[derive(Default)]
pub struct MemoryWebhookStore {
    subscriptions: RwLock<HashMap<EntityId, WebhookSubscription>>,
    deliveries: RwLock<HashMap<EntityId, WebhookDelivery>>,
}

impl MemoryWebhookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WebhookStore for MemoryWebhookStore {
    async fn insert_subscription(&self, sub: &WebhookSubscription) -> Result<(), StoreError> {
        self.subscriptions.write().await.insert(sub.id, sub.clone());
        Ok(())
    }

    async fn update_subscription(
        &self,
        owner_id: EntityId,
        id: EntityId,
        changes: &SubscriptionChanges,
    ) -> Result<Option<WebhookSubscription>, StoreError> {
        let mut subscriptions = self.subscriptions.write().await;
        let Some(sub) = subscriptions.get_mut(&id).filter(|s| s.owner_id == owner_id) else {
            return Ok(None);
        };

        if let Some(url) = &changes.url {
            sub.url = url.clone();
        }
        if let Some(events) = &changes.events {
            sub.events = events.iter().map(|e| e.as_str().to_string()).collect();
        }
        if let Some(is_active) = changes.is_active {
            sub.is_active = is_active;
        }
        if let Some(metadata) = &changes.metadata {
            sub.metadata = metadata.clone();
        }
        sub.updated_at = chrono::Utc::now();

        Ok(Some(sub.clone()))
    }

    async fn delete_subscription(
        &self,
        owner_id: EntityId,
        id: EntityId,
    ) -> Result<bool, StoreError> {
        let mut subscriptions = self.subscriptions.write().await;
        match subscriptions.get(&id) {
            Some(sub) if sub.owner_id == owner_id => {
                subscriptions.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_subscriptions(
        &self,
        owner_id: EntityId,
    ) -> Result<Vec<WebhookSubscription>, StoreError> {
        let mut subs: Vec<_> = self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        subs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(subs)
    }

    async fn find_subscription(
        &self,
        owner_id: EntityId,
        id: EntityId,
    ) -> Result<Option<WebhookSubscription>, StoreError> {
        Ok(self
            .subscriptions
            .read()
            .await
            .get(&id)
            .filter(|s| s.owner_id == owner_id)
            .cloned())
    }

    async fn matching_subscriptions(
        &self,
        owner_id: EntityId,
        event: &str,
    ) -> Result<Vec<WebhookSubscription>, StoreError> {
        Ok(self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|s| {
                s.owner_id == owner_id && s.is_active && s.events.iter().any(|e| e == event)
            })
            .cloned()
            .collect())
    }

    async fn insert_delivery(&self, delivery: &WebhookDelivery) -> Result<(), StoreError> {
        self.deliveries
            .write()
            .await
            .insert(delivery.id, delivery.clone());
        Ok(())
    }

    async fn record_attempt(
        &self,
        delivery_id: EntityId,
        outcome: &AttemptOutcome,
    ) -> Result<(), StoreError> {
        let mut deliveries = self.deliveries.write().await;
        if let Some(delivery) = deliveries.get_mut(&delivery_id) {
            delivery.status = outcome.status.as_str().to_string();
            delivery.attempts = outcome.attempts;
            delivery.last_attempt_at = Some(outcome.last_attempt_at);
            delivery.response_code = outcome.response_code;
            delivery.response_body = outcome.response_body.clone();
            delivery.error = outcome.error.clone();
            delivery.delivered_at = outcome.delivered_at;
        }
        Ok(())
    }

    async fn list_deliveries(
        &self,
        subscription_id: EntityId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WebhookDelivery>, StoreError> {
        let mut deliveries: Vec<_> = self
            .deliveries
            .read()
            .await
            .values()
            .filter(|d| d.subscription_id == subscription_id)
            .cloned()
            .collect();
        deliveries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(deliveries
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn find_delivery(&self, id: EntityId) -> Result<Option<WebhookDelivery>, StoreError> {
        Ok(self.deliveries.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use hookrelay_core::EventType;
    use uuid::Uuid;

    use super::*;
    use crate::models::DeliveryStatus;

    fn subscription(owner_id: EntityId, events: &[&str], is_active: bool) -> WebhookSubscription {
        WebhookSubscription {
            id: Uuid::new_v4(),
            owner_id,
            url: "https://example.test/hook".into(),
            events: events.iter().map(|e| e.to_string()).collect(),
            secret: "whsec_test".into(),
            is_active,
            metadata: serde_json::Value::Object(Default::default()),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn matching_filters_owner_activity_and_event() {
        let store = MemoryWebhookStore::new();
        let owner = Uuid::new_v4();
        let other_owner = Uuid::new_v4();

        let matching = subscription(owner, &["task.completed"], true);
        let inactive = subscription(owner, &["task.completed"], false);
        let wrong_event = subscription(owner, &["file.created"], true);
        let foreign = subscription(other_owner, &["task.completed"], true);

        for sub in [&matching, &inactive, &wrong_event, &foreign] {
            store.insert_subscription(sub).await.unwrap();
        }

        let found = store
            .matching_subscriptions(owner, "task.completed")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, matching.id);
    }

    #[tokio::test]
    async fn update_is_owner_scoped_and_preserves_secret() {
        let store = MemoryWebhookStore::new();
        let owner = Uuid::new_v4();
        let sub = subscription(owner, &["task.completed"], true);
        store.insert_subscription(&sub).await.unwrap();

        // Wrong owner sees nothing.
        let miss = store
            .update_subscription(Uuid::new_v4(), sub.id, &SubscriptionChanges::default())
            .await
            .unwrap();
        assert!(miss.is_none());

        let changes = SubscriptionChanges {
            events: Some(vec![EventType::FileCreated]),
            is_active: Some(false),
            ..Default::default()
        };
        let updated = store
            .update_subscription(owner, sub.id, &changes)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.events, vec!["file.created".to_string()]);
        assert!(!updated.is_active);
        assert_eq!(updated.secret, sub.secret);
        assert!(updated.updated_at >= sub.updated_at);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let store = MemoryWebhookStore::new();
        let owner = Uuid::new_v4();
        let sub = subscription(owner, &["task.completed"], true);
        store.insert_subscription(&sub).await.unwrap();

        assert!(store.delete_subscription(owner, sub.id).await.unwrap());
        assert!(!store.delete_subscription(owner, sub.id).await.unwrap());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryWebhookStore::new();
        let owner = Uuid::new_v4();

        let mut first = subscription(owner, &["task.completed"], true);
        first.created_at = chrono::Utc::now() - chrono::Duration::seconds(10);
        let second = subscription(owner, &["task.completed"], true);

        store.insert_subscription(&first).await.unwrap();
        store.insert_subscription(&second).await.unwrap();

        let listed = store.list_subscriptions(owner).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn record_attempt_updates_delivery_fields() {
        let store = MemoryWebhookStore::new();
        let delivery = WebhookDelivery {
            id: Uuid::new_v4(),
            subscription_id: Uuid::new_v4(),
            event: "task.completed".into(),
            payload: serde_json::json!({"id": "p"}),
            status: "pending".into(),
            attempts: 0,
            last_attempt_at: None,
            response_code: None,
            response_body: None,
            error: None,
            created_at: chrono::Utc::now(),
            delivered_at: None,
        };
        store.insert_delivery(&delivery).await.unwrap();

        let now = chrono::Utc::now();
        let outcome = AttemptOutcome {
            attempts: 1,
            last_attempt_at: now,
            status: DeliveryStatus::Success,
            response_code: Some(200),
            response_body: Some("ok".into()),
            error: None,
            delivered_at: Some(now),
        };
        store.record_attempt(delivery.id, &outcome).await.unwrap();

        let stored = store.find_delivery(delivery.id).await.unwrap().unwrap();
        assert_eq!(stored.status, "success");
        assert_eq!(stored.attempts, 1);
        assert_eq!(stored.response_code, Some(200));
        assert!(stored.delivered_at.is_some());
    }
}
