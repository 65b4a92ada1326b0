use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::photo::Photo;

#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    #[serde(rename = "thumbnailUrl")]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "storageProvider")]
    pub storage_provider: String,
    #[serde(rename = "storageKey")]
    pub storage_key: String,
    #[serde(rename = "thumbnailKey")]
    pub thumbnail_key: Option<String>,
    pub width: i32,
    pub height: i32,
    pub size: i64,
    #[serde(rename = "isFeatured")]
    pub is_featured: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Category names joined with commas, matching the admin UI contract.
    pub category: String,
}

impl From<Photo> for PhotoResponse {
    fn from(photo: Photo) -> Self {
        Self {
            id: photo.id,
            title: photo.title,
            url: photo.url,
            thumbnail_url: photo.thumbnail_url,
            storage_provider: photo.storage_provider,
            storage_key: photo.storage_key,
            thumbnail_key: photo.thumbnail_key,
            width: photo.width,
            height: photo.height,
            size: photo.size,
            is_featured: photo.is_featured,
            created_at: photo.created_at,
            category: photo.categories.join(","),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListPhotosQuery {
    pub category: Option<String>,
    pub limit: Option<i64>,
}
