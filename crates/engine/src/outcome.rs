//! Terminal delivery outcome notifications.
//!
//! `emit` is fire-and-forget, so operators would otherwise only learn of
//! exhausted deliveries by polling history. The engine publishes every
//! terminal transition on a broadcast channel instead; with zero
//! subscribers the notification is silently dropped.

use hookrelay_core::types::EntityId;
use hookrelay_core::EventType;
use hookrelay_db::models::DeliveryStatus;
use serde::Serialize;

/// A delivery reached a terminal state.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryOutcome {
    pub delivery_id: EntityId,
    pub subscription_id: EntityId,
    pub event: EventType,
    /// `Success` or `Failed` — never `Pending`.
    pub status: DeliveryStatus,
    /// Total attempts made.
    pub attempts: i32,
}
