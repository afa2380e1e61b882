pub mod webhook;

pub use webhook::{
    AttemptOutcome, DeliveryStatus, NewSubscription, SubscriptionChanges,
    SubscriptionCreatedResponse, WebhookDelivery, WebhookEventPayload, WebhookSubscription,
};
