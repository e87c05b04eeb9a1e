use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::{extract::State, Json};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::routes::ServerState;
use common::types::ApiResponse;
use models::{agency, allocation};
use service::ledger::{
    AllocationVerification, EntryKind, LedgerSnapshot, LedgerTransaction,
};

#[utoipa::path(
    get, path = "/blockchain", tag = "blockchain",
    responses((status = 200, description = "Ledger Snapshot"))
)]
pub async fn snapshot(State(state): State<ServerState>) -> Json<ApiResponse<LedgerSnapshot>> {
    Json(ApiResponse::ok(state.ledger.snapshot()))
}

fn str_field<'a>(data: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

fn f64_field(data: &serde_json::Value, key: &str) -> Option<f64> {
    data.get(key).and_then(|v| v.as_f64())
}

fn u64_field(data: &serde_json::Value, key: &str) -> Option<u64> {
    data.get(key).and_then(|v| v.as_u64())
}

/// Mirror-write dispatch: `{ action, data }` with one of the three record
/// actions. Field checks mirror the entity endpoints but target the ledger.
#[utoipa::path(
    post, path = "/blockchain", tag = "blockchain",
    request_body = crate::openapi::LedgerRecordRequest,
    responses(
        (status = 201, description = "Recorded"),
        (status = 400, description = "Invalid Action Or Fields")
    )
)]
pub async fn record(
    State(state): State<ServerState>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>), ApiError> {
    let action = body.get("action").and_then(|v| v.as_str()).unwrap_or_default();
    let data = body.get("data").cloned().unwrap_or(serde_json::Value::Null);

    let result = match action {
        "createAllocation" => {
            let (agency, project, amount) = match (
                str_field(&data, "agency"),
                str_field(&data, "project"),
                f64_field(&data, "amount"),
            ) {
                (Some(a), Some(p), Some(m)) => (a, p, m),
                _ => return Err(ApiError::bad_request("Agency, project, and amount are required")),
            };
            let (entry, tx) = state.ledger.record_allocation(agency, project, amount);
            info!(id = entry.id, block = tx.block_number, "ledger allocation recorded");
            serde_json::json!({ "allocation": entry, "transaction": tx })
        }
        "createRelease" => {
            let (allocation_id, amount, description) = match (
                u64_field(&data, "allocation_id"),
                f64_field(&data, "amount"),
                str_field(&data, "description"),
            ) {
                (Some(id), Some(m), Some(d)) => (id, m, d),
                _ => return Err(ApiError::bad_request("Allocation ID, amount, and description are required")),
            };
            let (entry, tx) = state.ledger.record_release(allocation_id, amount, description)?;
            info!(id = entry.id, block = tx.block_number, "ledger release recorded");
            serde_json::json!({ "release": entry, "transaction": tx })
        }
        "createExpenditure" => {
            let (release_id, amount, beneficiary, document_hash) = match (
                u64_field(&data, "release_id"),
                f64_field(&data, "amount"),
                str_field(&data, "beneficiary"),
                str_field(&data, "document_hash"),
            ) {
                (Some(id), Some(m), Some(b), Some(h)) => (id, m, b, h),
                _ => {
                    return Err(ApiError::bad_request(
                        "Release ID, amount, beneficiary, and document hash are required",
                    ))
                }
            };
            let (entry, tx) = state.ledger.record_expenditure(release_id, amount, beneficiary, document_hash)?;
            info!(id = entry.id, block = tx.block_number, "ledger expenditure recorded");
            serde_json::json!({ "expenditure": entry, "transaction": tx })
        }
        _ => return Err(ApiError::bad_request("Invalid action")),
    };

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(result))))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct TransactionsQuery {
    pub tx_hash: Option<String>,
    pub data_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TransactionsOutput {
    One(LedgerTransaction),
    Many(Vec<LedgerTransaction>),
}

#[utoipa::path(
    get, path = "/blockchain/transactions", tag = "blockchain",
    params(TransactionsQuery),
    responses(
        (status = 200, description = "Transactions"),
        (status = 404, description = "Transaction Not Found")
    )
)]
pub async fn transactions(
    State(state): State<ServerState>,
    Query(q): Query<TransactionsQuery>,
) -> Result<Json<ApiResponse<TransactionsOutput>>, ApiError> {
    if let Some(tx_hash) = q.tx_hash.as_deref() {
        let tx = state
            .ledger
            .transaction(tx_hash)
            .ok_or_else(|| ApiError::not_found("Transaction not found"))?;
        return Ok(Json(ApiResponse::ok(TransactionsOutput::One(tx))));
    }
    // An unrecognized data_type filter is dropped rather than rejected
    let kind = q.data_type.as_deref().and_then(|s| EntryKind::from_str(s).ok());
    Ok(Json(ApiResponse::ok(TransactionsOutput::Many(state.ledger.transactions(kind)))))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct VerifyQuery {
    pub allocation_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub issues: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkVerification {
    pub verifications: Vec<AllocationVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum VerifyOutput {
    One(AllocationVerification),
    All(BulkVerification),
}

#[utoipa::path(
    get, path = "/blockchain/verify", tag = "blockchain",
    params(VerifyQuery),
    responses(
        (status = 200, description = "Verification Result"),
        (status = 404, description = "Allocation Not Found")
    )
)]
pub async fn verify(
    State(state): State<ServerState>,
    Query(q): Query<VerifyQuery>,
) -> Result<Json<ApiResponse<VerifyOutput>>, ApiError> {
    if let Some(id) = q.allocation_id {
        let db_allocation = allocation::Entity::find_by_id(id)
            .one(&state.db)
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?
            .ok_or_else(|| ApiError::not_found("Allocation not found in database"))?;
        let agency_name = agency_name_of(&state, db_allocation.agency_id).await?;
        let verification =
            state.ledger.verify_allocation(&agency_name, &db_allocation.title, db_allocation.amount);
        return Ok(Json(ApiResponse::ok(VerifyOutput::One(verification))));
    }

    let db_allocations = allocation::Entity::find()
        .all(&state.db)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let agency_ids: Vec<Uuid> = db_allocations.iter().map(|a| a.agency_id).collect();
    let agencies: HashMap<Uuid, String> = agency::Entity::find()
        .filter(agency::Column::Id.is_in(agency_ids))
        .all(&state.db)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();

    let verifications: Vec<AllocationVerification> = db_allocations
        .iter()
        .map(|a| {
            let agency_name = agencies.get(&a.agency_id).map(String::as_str).unwrap_or("");
            state.ledger.verify_allocation(agency_name, &a.title, a.amount)
        })
        .collect();

    let valid = verifications.iter().filter(|v| v.is_valid).count();
    let summary = VerificationSummary {
        total: verifications.len(),
        valid,
        invalid: verifications.len() - valid,
        issues: verifications.iter().flat_map(|v| v.differences.iter().cloned()).collect(),
    };

    Ok(Json(ApiResponse::ok(VerifyOutput::All(BulkVerification { verifications, summary }))))
}

async fn agency_name_of(state: &ServerState, id: Uuid) -> Result<String, ApiError> {
    let found = agency::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(found.map(|a| a.name).unwrap_or_default())
}
