use axum::{extract::State, Json};

use crate::errors::ApiError;
use crate::routes::ServerState;
use common::types::ApiResponse;
use service::db::dashboard_service::{self, DashboardData};

#[utoipa::path(
    get, path = "/dashboard", tag = "dashboard",
    responses(
        (status = 200, description = "OK"),
        (status = 500, description = "Aggregation Failed")
    )
)]
pub async fn overview(State(state): State<ServerState>) -> Result<Json<ApiResponse<DashboardData>>, ApiError> {
    let data = dashboard_service::overview(&state.db).await?;
    Ok(Json(ApiResponse::ok(data)))
}
