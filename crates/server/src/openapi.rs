use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(utoipa::ToSchema)]
pub struct CreateAgencyRequest {
    pub name: String,
    pub acronym: Option<String>,
    pub category: String,
    pub description: Option<String>,
    pub parent_agency_id: Option<Uuid>,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct CreateAllocationRequest {
    pub agency_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub amount: f64,
    pub fiscal_year: i32,
    pub uacs_code: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct CreateReleaseRequest {
    pub allocation_id: Uuid,
    pub agency_id: Uuid,
    pub amount: f64,
    pub description: Option<String>,
    pub reference_no: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct CreateExpenditureRequest {
    pub release_id: Uuid,
    pub project_id: Option<Uuid>,
    pub amount: f64,
    pub beneficiary: String,
    pub description: Option<String>,
    pub document_hash: Option<String>,
    pub category: String,
}

#[derive(utoipa::ToSchema)]
pub struct CreateProjectRequest {
    pub allocation_id: Uuid,
    pub agency_id: Uuid,
    pub release_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub budget: f64,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct UploadDocumentRequest {
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub document_type: String,
    pub reference_id: String,
    pub description: Option<String>,
    pub uploaded_by: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct BroadcastRequest {
    pub event: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    pub room: Option<String>,
}

/// `{ action, data }` dispatch for ledger mirror writes.
#[derive(utoipa::ToSchema)]
pub struct LedgerRecordRequest {
    pub action: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::agencies::list,
        crate::routes::agencies::create,
        crate::routes::allocations::list,
        crate::routes::allocations::create,
        crate::routes::releases::list,
        crate::routes::releases::create,
        crate::routes::expenditures::list,
        crate::routes::expenditures::create,
        crate::routes::projects::list,
        crate::routes::projects::create,
        crate::routes::documents::list,
        crate::routes::documents::upload,
        crate::routes::dashboard::overview,
        crate::routes::realtime::poll,
        crate::routes::realtime::broadcast,
        crate::routes::ledger::snapshot,
        crate::routes::ledger::record,
        crate::routes::ledger::transactions,
        crate::routes::ledger::verify,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            CreateAgencyRequest,
            CreateAllocationRequest,
            CreateReleaseRequest,
            CreateExpenditureRequest,
            CreateProjectRequest,
            UploadDocumentRequest,
            BroadcastRequest,
            LedgerRecordRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "agencies"),
        (name = "allocations"),
        (name = "releases"),
        (name = "expenditures"),
        (name = "projects"),
        (name = "documents"),
        (name = "dashboard"),
        (name = "realtime"),
        (name = "blockchain")
    )
)]
pub struct ApiDoc;
