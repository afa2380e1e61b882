//! Domain primitives for the hookrelay webhook delivery service.
//!
//! This crate has zero internal dependencies so it can be used by the
//! store, engine, and API layers alike:
//!
//! - [`types`] — id and timestamp aliases.
//! - [`error`] — the [`CoreError`](error::CoreError) domain error.
//! - [`events`] — the closed [`EventType`](events::EventType) vocabulary.
//! - [`signature`] — HMAC payload signing and verification.
//! - [`secrets`] — webhook signing-secret generation.
//! - [`backoff`] — exponential retry delay computation.

pub mod backoff;
pub mod error;
pub mod events;
pub mod secrets;
pub mod signature;
pub mod types;

pub use error::CoreError;
pub use events::EventType;
