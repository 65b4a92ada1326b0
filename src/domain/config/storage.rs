use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::services::StorageError;

pub const DEFAULT_UPLOAD_DIR: &str = "public/uploads";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "r2")]
    R2,
    #[serde(rename = "github")]
    Github,
}

impl Provider {
    pub fn parse(value: &str) -> Result<Self, StorageError> {
        match value {
            "local" => Ok(Provider::Local),
            "r2" => Ok(Provider::R2),
            "github" => Ok(Provider::Github),
            other => Err(StorageError::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum GithubAccessMethod {
    #[serde(rename = "raw")]
    Raw,
    #[default]
    #[serde(rename = "jsdelivr")]
    Jsdelivr,
    #[serde(rename = "pages")]
    Pages,
}

impl GithubAccessMethod {
    /// Unrecognized values fall back to jsDelivr.
    pub fn parse(value: &str) -> Self {
        match value {
            "raw" => GithubAccessMethod::Raw,
            "pages" => GithubAccessMethod::Pages,
            _ => GithubAccessMethod::Jsdelivr,
        }
    }
}

/// Storage backend selection plus per-backend settings, assembled from the
/// persisted settings store on every resolution.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub provider: Provider,
    pub upload_dir: String,
    pub github_token: Option<String>,
    pub github_repo: Option<String>,
    pub github_path: Option<String>,
    pub github_branch: Option<String>,
    pub github_access_method: Option<GithubAccessMethod>,
    pub github_pages_url: Option<String>,
    pub r2_access_key_id: Option<String>,
    pub r2_secret_access_key: Option<String>,
    pub r2_bucket: Option<String>,
    pub r2_endpoint: Option<String>,
    pub r2_public_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Local,
            upload_dir: DEFAULT_UPLOAD_DIR.to_string(),
            github_token: None,
            github_repo: None,
            github_path: None,
            github_branch: None,
            github_access_method: None,
            github_pages_url: None,
            r2_access_key_id: None,
            r2_secret_access_key: None,
            r2_bucket: None,
            r2_endpoint: None,
            r2_public_url: None,
        }
    }
}

fn opt(settings: &HashMap<String, String>, key: &str) -> Option<String> {
    settings.get(key).filter(|v| !v.is_empty()).cloned()
}

impl StorageConfig {
    pub fn from_settings(settings: &HashMap<String, String>) -> Result<Self, StorageError> {
        let provider = match opt(settings, "storage_provider") {
            Some(name) => Provider::parse(&name)?,
            None => Provider::Local,
        };

        Ok(Self {
            provider,
            upload_dir: opt(settings, "upload_dir")
                .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
            github_token: opt(settings, "github_token"),
            github_repo: opt(settings, "github_repo"),
            github_path: opt(settings, "github_path"),
            github_branch: opt(settings, "github_branch"),
            github_access_method: opt(settings, "github_access_method")
                .map(|m| GithubAccessMethod::parse(&m)),
            github_pages_url: opt(settings, "github_pages_url"),
            r2_access_key_id: opt(settings, "r2_access_key_id"),
            r2_secret_access_key: opt(settings, "r2_secret_access_key"),
            r2_bucket: opt(settings, "r2_bucket"),
            r2_endpoint: opt(settings, "r2_endpoint"),
            r2_public_url: opt(settings, "r2_public_url"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_settings_select_local_with_default_root() {
        let config = StorageConfig::from_settings(&HashMap::new()).unwrap();
        assert_eq!(config.provider, Provider::Local);
        assert_eq!(config.upload_dir, DEFAULT_UPLOAD_DIR);
    }

    #[test]
    fn blank_provider_value_falls_back_to_local() {
        let config = StorageConfig::from_settings(&settings(&[("storage_provider", "")])).unwrap();
        assert_eq!(config.provider, Provider::Local);
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let err =
            StorageConfig::from_settings(&settings(&[("storage_provider", "dropbox")])).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_PROVIDER");
    }

    #[test]
    fn github_settings_are_picked_up() {
        let config = StorageConfig::from_settings(&settings(&[
            ("storage_provider", "github"),
            ("github_token", "ghp_x"),
            ("github_repo", "octo/gallery"),
            ("github_branch", "cdn"),
            ("github_access_method", "raw"),
        ]))
        .unwrap();
        assert_eq!(config.provider, Provider::Github);
        assert_eq!(config.github_token.as_deref(), Some("ghp_x"));
        assert_eq!(config.github_branch.as_deref(), Some("cdn"));
        assert_eq!(config.github_access_method, Some(GithubAccessMethod::Raw));
    }

    #[test]
    fn unrecognized_access_method_falls_back_to_jsdelivr() {
        assert_eq!(GithubAccessMethod::parse("ftp"), GithubAccessMethod::Jsdelivr);
    }
}
