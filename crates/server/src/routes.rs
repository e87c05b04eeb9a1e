use axum::http::HeaderMap;
use axum::{routing::get, routing::post, Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::db::audit_log_service::RequestMeta;

pub mod agencies;
pub mod allocations;
pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod expenditures;
pub mod ledger;
pub mod projects;
pub mod realtime;
pub mod releases;

pub use auth::{ServerAuthConfig, ServerState};

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Caller context recorded in the audit trail.
pub(crate) fn request_meta(headers: &HeaderMap) -> RequestMeta {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    RequestMeta {
        ip_address: Some(header("x-forwarded-for").unwrap_or_else(|| "unknown".into())),
        user_agent: Some(header("user-agent").unwrap_or_else(|| "unknown".into())),
    }
}

/// Build the full application router over the shared server state
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/agencies", get(agencies::list).post(agencies::create))
        .route("/allocations", get(allocations::list).post(allocations::create))
        .route("/releases", get(releases::list).post(releases::create))
        .route("/expenditures", get(expenditures::list).post(expenditures::create))
        .route("/projects", get(projects::list).post(projects::create))
        .route("/documents", get(documents::list).post(documents::upload))
        .route("/dashboard", get(dashboard::overview))
        .route("/auth/login", post(auth::login).get(auth::method_not_allowed))
        .route("/realtime", get(realtime::poll).post(realtime::broadcast))
        .route("/blockchain", get(ledger::snapshot).post(ledger::record))
        .route("/blockchain/transactions", get(ledger::transactions))
        .route("/blockchain/verify", get(ledger::verify))
        .with_state(state);

    api.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", crate::openapi::ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                ),
        )
}
