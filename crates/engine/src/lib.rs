//! The hookrelay delivery engine.
//!
//! [`WebhookEngine`] is the single service object the rest of the system
//! talks to. It owns the store handle, the outbound HTTP client, and the
//! in-process retry timers:
//!
//! - [`registry`] — subscription CRUD and delivery history.
//! - [`dispatcher`] — `emit` fan-out and the per-delivery attempt loop.
//! - [`executor`] — one signed HTTP POST attempt.
//! - [`scheduler`] — exponentially backed-off retry timers, keyed by
//!   delivery id, cancellable at shutdown.
//! - [`outcome`] — broadcast channel of terminal delivery outcomes.
//!
//! Construct the engine once at process start and share it via
//! `Arc<WebhookEngine>`.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod outcome;
pub mod registry;
pub mod scheduler;
pub mod service;

pub use config::EngineConfig;
pub use error::EngineError;
pub use outcome::DeliveryOutcome;
pub use service::WebhookEngine;
