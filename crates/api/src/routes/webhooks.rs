//! Owner-scoped webhook subscription management.
//!
//! Provides CRUD for subscriptions and per-subscription delivery
//! history. The signing secret appears in exactly one response: the
//! creation response.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use hookrelay_core::types::EntityId;
use hookrelay_db::models::{NewSubscription, SubscriptionChanges, SubscriptionCreatedResponse};

use crate::error::AppResult;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/accounts/{owner_id}/webhooks
///
/// Register a new webhook subscription. The response includes the
/// signing secret — the only time it is ever exposed.
async fn create_webhook(
    State(state): State<AppState>,
    Path(owner_id): Path<EntityId>,
    Json(input): Json<NewSubscription>,
) -> AppResult<impl IntoResponse> {
    let sub = state.engine.register_webhook(owner_id, input).await?;
    let created = SubscriptionCreatedResponse::from(sub);
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/accounts/{owner_id}/webhooks
///
/// List the account's subscriptions, newest first. Secrets are omitted.
async fn list_webhooks(
    State(state): State<AppState>,
    Path(owner_id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let subs = state.engine.list_webhooks(owner_id).await?;
    Ok(Json(DataResponse { data: subs }))
}

/// PATCH /api/v1/accounts/{owner_id}/webhooks/{webhook_id}
///
/// Update a subscription's url, events, active flag, or metadata.
/// The secret is immutable.
async fn update_webhook(
    State(state): State<AppState>,
    Path((owner_id, webhook_id)): Path<(EntityId, EntityId)>,
    Json(changes): Json<SubscriptionChanges>,
) -> AppResult<impl IntoResponse> {
    let updated = state
        .engine
        .update_webhook(owner_id, webhook_id, changes)
        .await?;
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/accounts/{owner_id}/webhooks/{webhook_id}
///
/// Delete a subscription. Idempotent; delivery history is kept.
async fn delete_webhook(
    State(state): State<AppState>,
    Path((owner_id, webhook_id)): Path<(EntityId, EntityId)>,
) -> AppResult<impl IntoResponse> {
    state.engine.delete_webhook(owner_id, webhook_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/accounts/{owner_id}/webhooks/{webhook_id}/deliveries
///
/// Delivery history for a subscription, newest first.
async fn list_deliveries(
    State(state): State<AppState>,
    Path((owner_id, webhook_id)): Path<(EntityId, EntityId)>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let deliveries = state
        .engine
        .get_delivery_history(owner_id, webhook_id, params.limit, params.offset)
        .await?;
    Ok(Json(DataResponse { data: deliveries }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/accounts/{owner_id}/webhooks",
            get(list_webhooks).post(create_webhook),
        )
        .route(
            "/accounts/{owner_id}/webhooks/{webhook_id}",
            axum::routing::patch(update_webhook).delete(delete_webhook),
        )
        .route(
            "/accounts/{owner_id}/webhooks/{webhook_id}/deliveries",
            get(list_deliveries),
        )
}
