mod error;
mod github_storage;
mod local_storage;
mod r2_storage;

pub use error::StorageError;
pub use github_storage::GithubStorageProvider;
pub use local_storage::LocalStorageProvider;
pub use r2_storage::R2StorageProvider;

use std::sync::Arc;

use crate::{
    application::services::StorageProvider,
    domain::config::storage::{Provider, StorageConfig},
};

/// Construct the provider selected by `config`. Construction validates the
/// backend's configuration, so a misconfigured backend fails here rather
/// than on the first upload.
pub fn create_storage_provider(
    config: &StorageConfig,
) -> Result<Arc<dyn StorageProvider>, StorageError> {
    match config.provider {
        Provider::Local => Ok(Arc::new(LocalStorageProvider::new(
            config.upload_dir.clone(),
        ))),
        Provider::Github => {
            let provider = GithubStorageProvider::new(config)?;
            Ok(Arc::new(provider))
        }
        Provider::R2 => {
            let provider = R2StorageProvider::new(config)?;
            Ok(Arc::new(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_local_by_default() {
        let provider = create_storage_provider(&StorageConfig::default()).unwrap();
        assert_eq!(provider.name(), "local");
    }

    #[test]
    fn selects_github_when_configured() {
        let mut config = StorageConfig::default();
        config.provider = Provider::Github;
        config.github_token = Some("ghp_test".to_string());
        config.github_repo = Some("octo/gallery".to_string());
        let provider = create_storage_provider(&config).unwrap();
        assert_eq!(provider.name(), "github");
    }

    #[test]
    fn github_misconfiguration_surfaces_at_selection_time() {
        let mut config = StorageConfig::default();
        config.provider = Provider::Github;
        let err = create_storage_provider(&config).unwrap_err();
        assert_eq!(err.code(), "GITHUB_TOKEN_MISSING");
    }

    #[test]
    fn r2_misconfiguration_surfaces_at_selection_time() {
        let mut config = StorageConfig::default();
        config.provider = Provider::R2;
        let err = create_storage_provider(&config).unwrap_err();
        assert_eq!(err.code(), "R2_CREDENTIALS_MISSING");
    }
}
