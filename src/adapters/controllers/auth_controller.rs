use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::{info, warn};

use crate::{
    adapters::{
        dto::auth_dto::{LoginRequest, LoginResponse},
        middleware::sign_token,
    },
    application::{
        error::ApplicationError, repositories::user_repository::UserRepository,
        services::password::verify_password,
    },
    domain::config::auth::AuthConfig,
};

pub struct AuthController;

impl AuthController {
    /// POST /api/auth/login
    pub async fn login(
        State(auth): State<AuthConfig>,
        State(user_repo): State<Arc<dyn UserRepository>>,
        Json(body): Json<LoginRequest>,
    ) -> Result<Json<LoginResponse>, ApplicationError> {
        if body.username.is_empty() || body.password.is_empty() {
            return Err(ApplicationError::BadRequest(
                "Username and password are required".to_string(),
            ));
        }

        let user = user_repo
            .find_by_username(&body.username)
            .await?
            .ok_or_else(|| {
                warn!("Login attempt for unknown user");
                ApplicationError::Unauthorized
            })?;

        if !verify_password(&body.password, &user.password_hash)? {
            warn!("Login attempt with wrong password for {}", user.username);
            return Err(ApplicationError::Unauthorized);
        }

        let token = sign_token(&auth, &user.id.to_string(), &user.username)?;
        info!("Admin logged in: {}", user.username);

        Ok(Json(LoginResponse {
            success: true,
            token,
        }))
    }
}
