use serde::{Deserialize, Serialize};

/// Everything needed to persist a freshly uploaded photo.
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub title: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub storage_provider: String,
    pub storage_key: String,
    pub thumbnail_key: Option<String>,
    pub width: i32,
    pub height: i32,
    pub size: i64,
    pub categories: Vec<String>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PhotoUpdate {
    pub title: Option<String>,
    #[serde(rename = "isFeatured")]
    pub is_featured: Option<bool>,
}

impl PhotoUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.is_featured.is_none()
    }
}
