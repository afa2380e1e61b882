//! Event emission endpoint.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use hookrelay_core::types::EntityId;
use hookrelay_core::EventType;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for POST /events.
#[derive(Debug, Deserialize)]
pub struct EmitRequest {
    /// One of the closed set of event-type wire names.
    pub event: EventType,
    /// Arbitrary JSON payload describing the event.
    pub data: Option<serde_json::Value>,
}

/// Acknowledgement of an accepted emission.
#[derive(Debug, Serialize)]
pub struct EmitResponse {
    pub accepted: bool,
    pub event: EventType,
}

/// POST /api/v1/accounts/{owner_id}/events
///
/// Emit an event for the account. Fire-and-forget: a 202 only means the
/// fan-out was initiated; delivery results land in delivery history.
async fn emit_event(
    State(state): State<AppState>,
    Path(owner_id): Path<EntityId>,
    Json(input): Json<EmitRequest>,
) -> AppResult<impl IntoResponse> {
    let data = input
        .data
        .unwrap_or_else(|| serde_json::Value::Object(Default::default()));

    state.engine.emit(owner_id, input.event, data).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: EmitResponse {
                accepted: true,
                event: input.event,
            },
        }),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/accounts/{owner_id}/events", post(emit_event))
}
