use std::sync::Arc;

use axum::http::StatusCode;
use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::ApiError;
use common::types::ApiResponse;
use service::auth::{AuthService, LoginInput};
use service::ledger::Ledger;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    pub ledger: Arc<Ledger>,
}

#[derive(Serialize)]
pub struct LoginOutput {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub agency_id: Option<Uuid>,
    pub session_token: String,
}

#[utoipa::path(
    post, path = "/auth/login", tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Logged In"),
        (status = 400, description = "Missing Fields"),
        (status = 401, description = "Invalid Credentials")
    )
)]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<ApiResponse<LoginOutput>>), ApiError> {
    if input.email.trim().is_empty() || input.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let svc = AuthService::new(state.auth.jwt_secret.clone());
    let session = svc.login(&state.db, input).await?;

    let mut cookie = Cookie::new("auth_token", session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(axum_extra::extract::cookie::SameSite::Lax);
    let jar = jar.add(cookie);

    tracing::info!(user_id = %session.user.id, "login successful");
    let out = LoginOutput {
        id: session.user.id,
        email: session.user.email,
        name: session.user.name,
        role: session.user.role,
        agency_id: session.user.agency_id,
        session_token: session.token,
    };
    Ok((jar, Json(ApiResponse::ok(out))))
}

/// The login path only accepts POST; everything else gets the envelope 405.
pub async fn method_not_allowed() -> (StatusCode, Json<ApiResponse<()>>) {
    (StatusCode::METHOD_NOT_ALLOWED, Json(ApiResponse::error("Method not allowed")))
}
