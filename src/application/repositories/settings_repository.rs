use std::collections::HashMap;

use async_trait::async_trait;

use crate::application::error::ApplicationError;

/// Persisted key/value settings. The storage resolver re-reads these on
/// every resolution so an admin can switch backends at runtime.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get_all(&self) -> Result<HashMap<String, String>, ApplicationError>;
    async fn upsert_many(
        &self,
        values: HashMap<String, String>,
    ) -> Result<HashMap<String, String>, ApplicationError>;
}
