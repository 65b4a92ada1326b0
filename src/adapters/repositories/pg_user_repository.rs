use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query_as, FromRow};
use uuid::Uuid;

use crate::{
    application::{error::ApplicationError, repositories::user_repository::UserRepository},
    domain::models::user::User,
};

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

pub struct PgUserRepository {
    pool: sqlx::PgPool,
}

impl PgUserRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApplicationError> {
        let query = "SELECT id, username, password_hash, created_at FROM users WHERE username = $1";

        let row: Option<UserRow> = query_as(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, ApplicationError> {
        let query = r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, username, password_hash, created_at
        "#;

        let row: UserRow = query_as(query)
            .bind(Uuid::new_v4())
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(row.into())
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}
