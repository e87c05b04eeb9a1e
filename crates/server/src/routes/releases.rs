use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::routes::{request_meta, ServerState};
use common::types::ApiResponse;
use service::db::release_service::{self, CreateRelease, ReleaseFilter, ReleaseView};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    pub allocation_id: Option<Uuid>,
    pub agency_id: Option<Uuid>,
    pub status: Option<String>,
}

#[utoipa::path(
    get, path = "/releases", tag = "releases",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK"),
        (status = 500, description = "List Failed")
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<ReleaseView>>>, ApiError> {
    let filter = ReleaseFilter { allocation_id: q.allocation_id, agency_id: q.agency_id, status: q.status };
    let releases = release_service::list_releases(&state.db, filter).await?;
    Ok(Json(ApiResponse::ok(releases)))
}

#[utoipa::path(
    post, path = "/releases", tag = "releases",
    request_body = crate::openapi::CreateReleaseRequest,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Parent Not Found")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(input): Json<CreateRelease>,
) -> Result<(StatusCode, Json<ApiResponse<models::release::Model>>), ApiError> {
    let meta = request_meta(&headers);
    let created = release_service::create_release(&state.db, input, &meta).await?;
    info!(id = %created.id, allocation_id = %created.allocation_id, amount = created.amount, "created release");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created))))
}
