use axum::extract::Query;
use axum::http::StatusCode;
use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::errors::ApiError;
use crate::routes::ServerState;
use common::pagination::Pagination;
use common::types::ApiResponse;
use service::db::document_service::{self, DocumentFilter, DocumentReceipt, UploadDocument};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    pub reference_id: Option<String>,
    pub document_type: Option<String>,
    /// 1-based page index, defaults to 1
    pub page: Option<u32>,
    /// items per page, defaults to 20, capped at 100
    pub per_page: Option<u32>,
}

#[utoipa::path(
    get, path = "/documents", tag = "documents",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK"),
        (status = 500, description = "List Failed")
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<models::document::Model>>>, ApiError> {
    let filter = DocumentFilter { reference_id: q.reference_id, document_type: q.document_type };
    let page = Pagination {
        page: q.page.unwrap_or(1),
        per_page: q.per_page.unwrap_or(20),
    };
    let documents = document_service::list_documents(&state.db, filter, page).await?;
    Ok(Json(ApiResponse::ok(documents)))
}

#[utoipa::path(
    post, path = "/documents", tag = "documents",
    request_body = crate::openapi::UploadDocumentRequest,
    responses(
        (status = 201, description = "Uploaded"),
        (status = 400, description = "Validation Error")
    )
)]
pub async fn upload(
    State(state): State<ServerState>,
    Json(input): Json<UploadDocument>,
) -> Result<(StatusCode, Json<ApiResponse<DocumentReceipt>>), ApiError> {
    let receipt = document_service::upload_document(&state.db, input).await?;
    info!(id = %receipt.id, hash = %receipt.ipfs_hash, "document pinned");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(receipt))))
}
