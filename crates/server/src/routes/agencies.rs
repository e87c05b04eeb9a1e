use axum::http::{HeaderMap, StatusCode};
use axum::{extract::State, Json};
use tracing::info;

use crate::errors::ApiError;
use crate::routes::{request_meta, ServerState};
use common::types::ApiResponse;
use service::db::agency_service::{self, AgencyWithCounts, CreateAgency};

#[utoipa::path(
    get, path = "/agencies", tag = "agencies",
    responses(
        (status = 200, description = "List OK"),
        (status = 500, description = "List Failed")
    )
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<ApiResponse<Vec<AgencyWithCounts>>>, ApiError> {
    let agencies = agency_service::list_agencies(&state.db).await?;
    Ok(Json(ApiResponse::ok(agencies)))
}

#[utoipa::path(
    post, path = "/agencies", tag = "agencies",
    request_body = crate::openapi::CreateAgencyRequest,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Parent Not Found")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(input): Json<CreateAgency>,
) -> Result<(StatusCode, Json<ApiResponse<models::agency::Model>>), ApiError> {
    let meta = request_meta(&headers);
    let created = agency_service::create_agency(&state.db, input, &meta).await?;
    info!(id = %created.id, name = %created.name, "created agency");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created))))
}
