use std::sync::Arc;

use hookrelay_engine::WebhookEngine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The webhook delivery engine.
    pub engine: Arc<WebhookEngine>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
