use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::ApiError;
use crate::routes::ServerState;
use common::types::ApiResponse;
use service::db::audit_log_service::{self, BroadcastUpdate};

const POLL_LIMIT: u64 = 50;

#[derive(Debug, Deserialize)]
pub struct BroadcastInput {
    pub event: String,
    pub data: serde_json::Value,
    #[serde(default)]
    pub room: Option<String>,
}

#[utoipa::path(
    post, path = "/realtime", tag = "realtime",
    request_body = crate::openapi::BroadcastRequest,
    responses(
        (status = 200, description = "Broadcasted"),
        (status = 400, description = "Missing Fields")
    )
)]
pub async fn broadcast(
    State(state): State<ServerState>,
    Json(input): Json<BroadcastInput>,
) -> Result<Json<ApiResponse<&'static str>>, ApiError> {
    if input.event.trim().is_empty() || input.data.is_null() {
        return Err(ApiError::bad_request("Event and data are required"));
    }
    audit_log_service::record_broadcast(&state.db, &input.event, &input.data, input.room.as_deref()).await?;
    Ok(Json(ApiResponse::ok("Update broadcasted")))
}

/// Clients poll this endpoint; there is no push channel.
#[utoipa::path(
    get, path = "/realtime", tag = "realtime",
    responses(
        (status = 200, description = "Recent Updates"),
        (status = 500, description = "Poll Failed")
    )
)]
pub async fn poll(State(state): State<ServerState>) -> Result<Json<ApiResponse<Vec<BroadcastUpdate>>>, ApiError> {
    let updates = audit_log_service::recent_broadcasts(&state.db, POLL_LIMIT).await?;
    Ok(Json(ApiResponse::ok(updates)))
}
