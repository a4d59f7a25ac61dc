//! Bearer token authentication.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Account every request acts as when auth is disabled.
pub const DEV_USER_ID: Uuid = Uuid::from_u128(0x65a950f6_a3b0_4be2_824a_b99051d5a62f);

/// Claims read from the access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
}

/// Authenticated user extracted from request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

impl AuthUser {
    fn dev() -> Self {
        Self {
            user_id: DEV_USER_ID,
            email: None,
        }
    }
}

/// Validate an HS256 token and return its claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Tokens from the identity provider carry an audience we don't pin.
    validation.validate_aud = false;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!("Token verification failed: {}", e);
            ApiError::unauthorized("Invalid or expired token")
        })
}

/// Axum extractor for authenticated user.
#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = &state.config.auth;
        if auth.disabled {
            return Ok(AuthUser::dev());
        }

        let token = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Missing or invalid authorization header"))?;

        let secret = auth
            .jwt_secret
            .as_deref()
            .ok_or_else(|| ApiError::internal("JWT_SECRET is not configured"))?;

        let claims = verify_token(token, secret)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| ApiError::InvalidUserId)?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::*;

    fn token(sub: &str, exp: i64, secret: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            email: Some("user@example.com".to_string()),
            exp,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn future() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn test_dev_user_id_literal() {
        assert_eq!(DEV_USER_ID.to_string(), "65a950f6-a3b0-4be2-824a-b99051d5a62f");
    }

    #[test]
    fn test_valid_token() {
        let sub = Uuid::new_v4().to_string();
        let claims = verify_token(&token(&sub, future(), "secret"), "secret").unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn test_wrong_secret_and_expired_tokens_are_unauthorized() {
        let sub = Uuid::new_v4().to_string();
        let err = verify_token(&token(&sub, future(), "secret"), "other").unwrap_err();
        assert_eq!(err.code(), "unauthorized");

        let expired = token(&sub, chrono::Utc::now().timestamp() - 3600, "secret");
        assert_eq!(verify_token(&expired, "secret").unwrap_err().code(), "unauthorized");
    }
}
