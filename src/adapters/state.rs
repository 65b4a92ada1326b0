use axum::extract::FromRef;
use std::sync::Arc;

use crate::{
    adapters::storage_resolver::StorageResolver,
    application::repositories::{
        photo_repository::PhotoRepository, settings_repository::SettingsRepository,
        user_repository::UserRepository,
    },
    domain::config::auth::AuthConfig,
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub auth: AuthConfig,
    pub photo_repository: Arc<dyn PhotoRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub settings_repository: Arc<dyn SettingsRepository>,
    pub storage: StorageResolver,
}
