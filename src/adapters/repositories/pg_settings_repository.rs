use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::application::{
    error::ApplicationError, repositories::settings_repository::SettingsRepository,
};

pub struct PgSettingsRepository {
    pool: sqlx::PgPool,
}

impl PgSettingsRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn get_all(&self) -> Result<HashMap<String, String>, ApplicationError> {
        debug!("Fetching settings from database");
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().collect())
    }

    async fn upsert_many(
        &self,
        values: HashMap<String, String>,
    ) -> Result<HashMap<String, String>, ApplicationError> {
        let query = r#"
            INSERT INTO settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
        "#;

        for (key, value) in &values {
            sqlx::query(query)
                .bind(key)
                .bind(value)
                .execute(&self.pool)
                .await
                .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;
        }

        self.get_all().await
    }
}
