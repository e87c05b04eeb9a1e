use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::routes::{request_meta, ServerState};
use common::types::ApiResponse;
use service::db::project_service::{self, CreateProject, ProjectFilter, ProjectView};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    pub allocation_id: Option<Uuid>,
    pub agency_id: Option<Uuid>,
    pub release_id: Option<Uuid>,
    pub status: Option<String>,
}

#[utoipa::path(
    get, path = "/projects", tag = "projects",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK"),
        (status = 500, description = "List Failed")
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<ProjectView>>>, ApiError> {
    let filter = ProjectFilter {
        allocation_id: q.allocation_id,
        agency_id: q.agency_id,
        release_id: q.release_id,
        status: q.status,
    };
    let projects = project_service::list_projects(&state.db, filter).await?;
    Ok(Json(ApiResponse::ok(projects)))
}

#[utoipa::path(
    post, path = "/projects", tag = "projects",
    request_body = crate::openapi::CreateProjectRequest,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Parent Not Found")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(input): Json<CreateProject>,
) -> Result<(StatusCode, Json<ApiResponse<models::project::Model>>), ApiError> {
    let meta = request_meta(&headers);
    let created = project_service::create_project(&state.db, input, &meta).await?;
    info!(id = %created.id, allocation_id = %created.allocation_id, budget = created.budget, "created project");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created))))
}
