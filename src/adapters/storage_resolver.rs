use std::sync::Arc;

use crate::{
    application::{
        error::ApplicationError, repositories::settings_repository::SettingsRepository,
        services::StorageProvider,
    },
    domain::config::storage::{Provider, StorageConfig},
    services::create_storage_provider,
};

/// Resolves the active storage provider from the persisted settings on
/// every call. Nothing is cached: an admin can switch backends at runtime
/// and the next request picks the change up.
#[derive(Clone)]
pub struct StorageResolver {
    settings_repository: Arc<dyn SettingsRepository>,
}

impl StorageResolver {
    pub fn new(settings_repository: Arc<dyn SettingsRepository>) -> Self {
        Self {
            settings_repository,
        }
    }

    /// Provider selected by the `storage_provider` setting.
    pub async fn resolve(&self) -> Result<Arc<dyn StorageProvider>, ApplicationError> {
        let config = self.load_config().await?;
        create_storage_provider(&config).map_err(Into::into)
    }

    /// Provider forced to `name`, with the rest of the configuration taken
    /// from settings. Used when an explicit provider was requested or when
    /// deleting objects owned by the provider recorded on a photo.
    pub async fn resolve_named(
        &self,
        name: &str,
    ) -> Result<Arc<dyn StorageProvider>, ApplicationError> {
        let mut config = self.load_config().await?;
        config.provider = Provider::parse(name).map_err(ApplicationError::from)?;
        create_storage_provider(&config).map_err(Into::into)
    }

    async fn load_config(&self) -> Result<StorageConfig, ApplicationError> {
        let settings = self.settings_repository.get_all().await?;
        StorageConfig::from_settings(&settings).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;

    struct FixedSettings(HashMap<String, String>);

    #[async_trait]
    impl SettingsRepository for FixedSettings {
        async fn get_all(&self) -> Result<HashMap<String, String>, ApplicationError> {
            Ok(self.0.clone())
        }

        async fn upsert_many(
            &self,
            _values: HashMap<String, String>,
        ) -> Result<HashMap<String, String>, ApplicationError> {
            unimplemented!("not used in these tests")
        }
    }

    fn resolver(pairs: &[(&str, &str)]) -> StorageResolver {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StorageResolver::new(Arc::new(FixedSettings(map)))
    }

    #[tokio::test]
    async fn resolves_local_when_nothing_is_configured() {
        let provider = resolver(&[]).resolve().await.unwrap();
        assert_eq!(provider.name(), "local");
    }

    #[tokio::test]
    async fn resolves_provider_from_settings() {
        let provider = resolver(&[
            ("storage_provider", "github"),
            ("github_token", "ghp_x"),
            ("github_repo", "octo/gallery"),
        ])
        .resolve()
        .await
        .unwrap();
        assert_eq!(provider.name(), "github");
    }

    #[tokio::test]
    async fn named_resolution_overrides_settings() {
        let provider = resolver(&[("storage_provider", "local")])
            .resolve_named("local")
            .await
            .unwrap();
        assert_eq!(provider.name(), "local");
    }

    #[tokio::test]
    async fn unknown_named_provider_is_an_error() {
        let result = resolver(&[]).resolve_named("dropbox").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn misconfigured_backend_fails_at_resolution() {
        let result = resolver(&[("storage_provider", "github")]).resolve().await;
        assert!(result.is_err());
    }
}
