//! Webhook subscription and delivery models and DTOs.

use std::fmt;
use std::str::FromStr;

use hookrelay_core::types::{EntityId, Timestamp};
use hookrelay_core::EventType;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// A row from the `webhook_subscriptions` table.
///
/// **Note:** `secret` is never serialized to responses. The one-time
/// creation response uses [`SubscriptionCreatedResponse`] instead.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WebhookSubscription {
    pub id: EntityId,
    pub owner_id: EntityId,
    pub url: String,
    /// Event-type wire names this subscription wants delivered (JSONB).
    #[sqlx(json)]
    pub events: Vec<String>,
    #[serde(skip_serializing)]
    pub secret: String,
    pub is_active: bool,
    /// Free-form key/value bag owned by the caller (JSONB).
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WebhookSubscription {
    /// Whether this subscription wants the given event type delivered.
    pub fn wants(&self, event: EventType) -> bool {
        self.events.iter().any(|e| e == event.as_str())
    }
}

/// DTO for registering a new subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubscription {
    pub url: String,
    /// Event types to subscribe to; deserialization enforces the closed set.
    pub events: Vec<EventType>,
    /// Signing secret. Generated when absent; immutable after creation.
    pub secret: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// DTO for updating an existing subscription.
///
/// The secret is deliberately not updatable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionChanges {
    pub url: Option<String>,
    pub events: Option<Vec<EventType>>,
    pub is_active: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}

/// Response returned when a subscription is created.
///
/// Includes the signing secret — the only time it is ever exposed.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionCreatedResponse {
    pub id: EntityId,
    pub owner_id: EntityId,
    pub url: String,
    pub events: Vec<String>,
    /// The full signing secret. Shown **once** and never serialized again.
    pub secret: String,
    pub is_active: bool,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<WebhookSubscription> for SubscriptionCreatedResponse {
    fn from(sub: WebhookSubscription) -> Self {
        Self {
            id: sub.id,
            owner_id: sub.owner_id,
            url: sub.url,
            events: sub.events,
            secret: sub.secret,
            is_active: sub.is_active,
            metadata: sub.metadata,
            created_at: sub.created_at,
            updated_at: sub.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Event payload
// ---------------------------------------------------------------------------

/// The JSON body POSTed to subscriber endpoints.
///
/// Constructed once per emission; every matching subscriber receives the
/// identically serialized payload, and retries of one delivery reuse the
/// exact same bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEventPayload {
    pub id: EntityId,
    pub event: EventType,
    pub timestamp: Timestamp,
    pub data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Lifecycle status of a delivery.
///
/// `Pending` is the only non-terminal state; `attempts` only ever
/// increases and a terminal status never transitions again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Success,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Success => "success",
            DeliveryStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeliveryStatus::Pending)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DeliveryStatus::Pending),
            "success" => Ok(DeliveryStatus::Success),
            "failed" => Ok(DeliveryStatus::Failed),
            other => Err(format!("unknown delivery status: {other}")),
        }
    }
}

/// A row from the `webhook_deliveries` table.
///
/// Tracks all attempts to deliver one payload to one subscription.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WebhookDelivery {
    pub id: EntityId,
    pub subscription_id: EntityId,
    /// Event-type wire name.
    pub event: String,
    /// The payload as sent (JSONB copy of [`WebhookEventPayload`]).
    pub payload: serde_json::Value,
    /// `pending`, `success`, or `failed`.
    pub status: String,
    /// HTTP attempts made so far. Starts at 0, incremented per try.
    pub attempts: i32,
    pub last_attempt_at: Option<Timestamp>,
    /// Status code of the most recent HTTP response, if one was received.
    pub response_code: Option<i16>,
    /// Truncated body of the most recent HTTP response.
    pub response_body: Option<String>,
    /// Transport-level error message of the most recent attempt, if any.
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub delivered_at: Option<Timestamp>,
}

/// The recorded outcome of a single delivery attempt.
///
/// Written by the executor after every attempt, success or failure,
/// before the retry decision is acted on.
#[derive(Debug, Clone)]
pub struct AttemptOutcome {
    /// Total attempts made, including this one.
    pub attempts: i32,
    pub last_attempt_at: Timestamp,
    /// `Pending` when retries remain, otherwise the terminal status.
    pub status: DeliveryStatus,
    pub response_code: Option<i16>,
    pub response_body: Option<String>,
    pub error: Option<String>,
    pub delivered_at: Option<Timestamp>,
}
