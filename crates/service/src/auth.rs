//! Login service with the transparency portal's placeholder credential rule:
//! government-domain addresses are accepted with any password, everyone else
//! must present the demo password. Sessions are HS256 JWTs.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use models::user;

const DEMO_PASSWORD: &str = "demo123";
const SESSION_TTL_SECS: i64 = 8 * 3600;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token error: {0}")]
    Token(String),
    #[error("database error: {0}")]
    Db(String),
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginSession {
    pub user: user::Model,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Addresses under the government mail domain skip the password check.
pub fn is_government_address(email: &str) -> bool {
    let lower = email.to_ascii_lowercase();
    lower.ends_with(".gov.ph") || lower.ends_with("@gov.ph")
}

pub struct AuthService {
    jwt_secret: String,
}

impl AuthService {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self { jwt_secret: jwt_secret.into() }
    }

    pub fn issue_token(&self, user_id: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims { sub: user_id.to_string(), exp: now + SESSION_TTL_SECS, iat: now };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(self.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::Token(e.to_string()))
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AuthError::Token(e.to_string()))?;
        Ok(data.claims)
    }

    pub async fn login(&self, db: &DatabaseConnection, input: LoginInput) -> Result<LoginSession, AuthError> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let found = user::find_by_email(db, &input.email)
            .await
            .map_err(|e| AuthError::Db(e.to_string()))?;
        let user = found.ok_or(AuthError::InvalidCredentials)?;

        if !is_government_address(&input.email) && input.password != DEMO_PASSWORD {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issue_token(&user.id.to_string())?;
        Ok(LoginSession { user, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn government_suffix_rule() {
        assert!(is_government_address("auditor@coa.gov.ph"));
        assert!(is_government_address("staff@gov.ph"));
        assert!(is_government_address("ADMIN@DBM.GOV.PH"));
        assert!(!is_government_address("someone@example.com"));
        assert!(!is_government_address("fake@gov.ph.example.com"));
    }

    #[test]
    fn token_roundtrip() {
        let svc = AuthService::new("test-secret");
        let token = svc.issue_token("user-123").unwrap();
        let claims = svc.decode_token(&token).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_rejects_wrong_secret() {
        let token = AuthService::new("secret-a").issue_token("u").unwrap();
        assert!(AuthService::new("secret-b").decode_token(&token).is_err());
    }
}
