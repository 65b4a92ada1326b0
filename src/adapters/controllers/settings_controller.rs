use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::Value;
use tracing::info;

use crate::{
    adapters::dto::response::ApiResponse,
    application::{
        error::ApplicationError, repositories::settings_repository::SettingsRepository,
    },
};

const DEFAULT_SITE_TITLE: &str = "MO GALLERY";

/// Settings exposed without authentication.
const PUBLIC_KEYS: &[&str] = &["site_title", "cdn_domain"];

/// Every known setting with its default, merged under whatever is stored.
fn default_settings() -> HashMap<String, String> {
    [
        ("site_title", ""),
        ("storage_provider", "local"),
        ("cdn_domain", ""),
        ("upload_dir", ""),
        ("r2_access_key_id", ""),
        ("r2_secret_access_key", ""),
        ("r2_bucket", ""),
        ("r2_endpoint", ""),
        ("github_token", ""),
        ("github_repo", ""),
        ("github_path", ""),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub struct SettingsController;

impl SettingsController {
    /// GET /api/admin/settings/public (no auth)
    pub async fn get_public_settings(
        State(settings_repo): State<Arc<dyn SettingsRepository>>,
    ) -> Result<Json<ApiResponse<HashMap<String, String>>>, ApplicationError> {
        let stored = settings_repo.get_all().await?;

        let mut config = HashMap::from([
            ("site_title".to_string(), DEFAULT_SITE_TITLE.to_string()),
            ("cdn_domain".to_string(), String::new()),
        ]);
        for key in PUBLIC_KEYS {
            if let Some(value) = stored.get(*key) {
                config.insert(key.to_string(), value.clone());
            }
        }

        Ok(Json(ApiResponse::new(config)))
    }

    /// GET /api/admin/settings
    pub async fn get_settings(
        State(settings_repo): State<Arc<dyn SettingsRepository>>,
    ) -> Result<Json<ApiResponse<HashMap<String, String>>>, ApplicationError> {
        let mut config = default_settings();
        config.extend(settings_repo.get_all().await?);
        Ok(Json(ApiResponse::new(config)))
    }

    /// PATCH /api/admin/settings
    pub async fn update_settings(
        State(settings_repo): State<Arc<dyn SettingsRepository>>,
        Json(body): Json<HashMap<String, Value>>,
    ) -> Result<Json<ApiResponse<HashMap<String, String>>>, ApplicationError> {
        let values: HashMap<String, String> = body
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect();

        info!("Updating {} settings", values.len());
        let updated = settings_repo.upsert_many(values).await?;
        Ok(Json(ApiResponse::new(updated)))
    }
}
