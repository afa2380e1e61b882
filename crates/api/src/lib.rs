//! HTTP surface for the hookrelay delivery engine.
//!
//! Exposes owner-scoped subscription CRUD, the emit endpoint, delivery
//! history, and a health check, all under the `{ "data": ... }`
//! response envelope.

pub mod config;
pub mod error;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
