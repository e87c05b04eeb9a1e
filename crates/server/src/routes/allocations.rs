use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::routes::{request_meta, ServerState};
use common::types::ApiResponse;
use service::db::allocation_service::{
    self, AllocationFilter, AllocationView, CreateAllocation,
};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    pub agency_id: Option<Uuid>,
    pub fiscal_year: Option<i32>,
    pub status: Option<String>,
    /// Comma-separated child collections: `releases`, `projects`
    pub include: Option<String>,
}

#[utoipa::path(
    get, path = "/allocations", tag = "allocations",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK"),
        (status = 500, description = "List Failed")
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<AllocationView>>>, ApiError> {
    let include = q.include.unwrap_or_default();
    let filter = AllocationFilter {
        agency_id: q.agency_id,
        fiscal_year: q.fiscal_year,
        status: q.status,
        include_releases: include.contains("releases"),
        include_projects: include.contains("projects"),
    };
    let allocations = allocation_service::list_allocations(&state.db, filter).await?;
    Ok(Json(ApiResponse::ok(allocations)))
}

#[utoipa::path(
    post, path = "/allocations", tag = "allocations",
    request_body = crate::openapi::CreateAllocationRequest,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Agency Not Found")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(input): Json<CreateAllocation>,
) -> Result<(StatusCode, Json<ApiResponse<models::allocation::Model>>), ApiError> {
    let meta = request_meta(&headers);
    let created = allocation_service::create_allocation(&state.db, input, &meta).await?;
    info!(id = %created.id, agency_id = %created.agency_id, amount = created.amount, "created allocation");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created))))
}
