use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Which storage backend holds the bytes ("local", "github", "r2").
    pub storage_provider: String,
    pub storage_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_key: Option<String>,
    pub width: i32,
    pub height: i32,
    pub size: i64,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub categories: Vec<String>,
}
