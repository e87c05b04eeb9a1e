use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::routes::{request_meta, ServerState};
use common::types::ApiResponse;
use service::db::expenditure_service::{
    self, CreateExpenditure, ExpenditureFilter, ExpenditureView,
};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    pub release_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub status: Option<String>,
    pub category: Option<String>,
}

#[utoipa::path(
    get, path = "/expenditures", tag = "expenditures",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK"),
        (status = 500, description = "List Failed")
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<ExpenditureView>>>, ApiError> {
    let filter = ExpenditureFilter {
        release_id: q.release_id,
        project_id: q.project_id,
        status: q.status,
        category: q.category,
    };
    let expenditures = expenditure_service::list_expenditures(&state.db, filter).await?;
    Ok(Json(ApiResponse::ok(expenditures)))
}

#[utoipa::path(
    post, path = "/expenditures", tag = "expenditures",
    request_body = crate::openapi::CreateExpenditureRequest,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Parent Not Found")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(input): Json<CreateExpenditure>,
) -> Result<(StatusCode, Json<ApiResponse<models::expenditure::Model>>), ApiError> {
    let meta = request_meta(&headers);
    let created = expenditure_service::create_expenditure(&state.db, input, &meta).await?;
    info!(id = %created.id, release_id = %created.release_id, amount = created.amount, "created expenditure");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created))))
}
