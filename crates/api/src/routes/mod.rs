pub mod events;
pub mod health;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// All routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(webhooks::router())
        .merge(events::router())
}
