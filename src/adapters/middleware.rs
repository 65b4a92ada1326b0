use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{application::error::ApplicationError, domain::config::auth::AuthConfig};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub iat: u64,
    pub exp: u64,
}

pub fn sign_token(
    auth: &AuthConfig,
    user_id: &str,
    username: &str,
) -> Result<String, ApplicationError> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| ApplicationError::InternalError(e.to_string()))?
        .as_secs();

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        iat: now,
        exp: now + auth.token_ttl,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApplicationError::InternalError(format!("Token signing failed: {}", e)))
}

pub fn verify_token(auth: &AuthConfig, token: &str) -> Result<Claims, ApplicationError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApplicationError::Unauthorized)
}

/// Middleware guarding the admin routes: requires a valid
/// `Authorization: Bearer <jwt>` header.
pub async fn require_auth(
    State(auth): State<AuthConfig>,
    headers: HeaderMap,
    request: Request<Body>,
    next: Next,
) -> Response {
    let token = match headers.get("Authorization") {
        Some(header_value) => match header_value.to_str() {
            Ok(value) => match value.strip_prefix("Bearer ") {
                Some(token) => token,
                None => {
                    warn!("Authorization header is not a Bearer token");
                    return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
                }
            },
            Err(_) => {
                warn!("Authorization header contains invalid UTF-8");
                return (StatusCode::BAD_REQUEST, "Bad request").into_response();
            }
        },
        None => {
            warn!("Authorization header is missing");
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
    };

    match verify_token(&auth, token) {
        Ok(_claims) => next.run(request).await,
        Err(_) => {
            warn!("Invalid or expired token");
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AuthConfig {
        AuthConfig::new("test-secret".to_string(), 3600)
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let auth = auth();
        let token = sign_token(&auth, "42", "admin").unwrap();
        let claims = verify_token(&auth, &token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_token(&auth(), "42", "admin").unwrap();
        let other = AuthConfig::new("other-secret".to_string(), 3600);
        assert!(verify_token(&other, &token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token(&auth(), "not.a.jwt").is_err());
    }
}
