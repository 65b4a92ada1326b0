use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::{
    application::services::{DeleteOutcome, StorageProvider},
    domain::{
        config::storage::{GithubAccessMethod, StorageConfig},
        models::upload::{UploadFile, UploadResult},
    },
    services::error::StorageError,
};

const GITHUB_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("gallery-service/", env!("CARGO_PKG_VERSION"));

const DEFAULT_BASE_PATH: &str = "uploads";
const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Deserialize)]
struct ContentInfo {
    sha: String,
}

/// Uses a GitHub repository as the content store. Files are committed
/// through the REST contents API and served via raw.githubusercontent.com,
/// the jsDelivr GitHub passthrough, or GitHub Pages.
pub struct GithubStorageProvider {
    client: Client,
    token: String,
    owner: String,
    repo: String,
    base_path: String,
    branch: String,
    access_method: GithubAccessMethod,
    pages_url: Option<String>,
}

impl GithubStorageProvider {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let token = config
            .github_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(StorageError::GithubTokenMissing)?;

        let repo_id = config.github_repo.as_deref().unwrap_or_default();
        let (owner, repo) = repo_id
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty())
            .ok_or(StorageError::GithubRepoInvalid)?;

        let access_method = config.github_access_method.unwrap_or_default();
        let pages_url = config
            .github_pages_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        if access_method == GithubAccessMethod::Pages && pages_url.is_none() {
            return Err(StorageError::GithubPagesUrlMissing);
        }

        let base_path = config
            .github_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_BASE_PATH)
            .to_string();
        let branch = config
            .github_branch
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_BRANCH)
            .to_string();

        Ok(Self {
            client: Client::new(),
            token: token.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            base_path,
            branch,
            access_method,
            pages_url,
        })
    }

    fn build_path(&self, filename: &str, subfolder: Option<&str>) -> String {
        let mut parts = vec![self.base_path.as_str()];
        if let Some(sub) = subfolder {
            parts.push(sub);
        }
        parts.push(filename);
        let joined = parts.join("/");

        // Collapse runs of slashes introduced by empty or padded segments.
        let mut path = String::with_capacity(joined.len());
        let mut prev_slash = false;
        for c in joined.chars() {
            if c == '/' {
                if !prev_slash {
                    path.push(c);
                }
                prev_slash = true;
            } else {
                path.push(c);
                prev_slash = false;
            }
        }
        path
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            GITHUB_API_BASE, self.owner, self.repo, path
        )
    }

    /// Fetch the blob SHA currently stored at `path` on the configured
    /// branch. `None` means the file does not exist; any other failure
    /// propagates.
    async fn fetch_sha(&self, path: &str) -> Result<Option<String>, StorageError> {
        let response = self
            .client
            .get(self.contents_url(path))
            .query(&[("ref", self.branch.as_str())])
            .bearer_auth(&self.token)
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StorageError::ProviderError(format!(
                "Content lookup for {} failed with status: {}",
                path,
                response.status()
            )));
        }

        let info: ContentInfo = response
            .json()
            .await
            .map_err(|e| StorageError::ProviderError(e.to_string()))?;
        Ok(Some(info.sha))
    }

    /// Create or update the file at `path`. An existing file's SHA is
    /// included so the commit updates the blob instead of colliding.
    async fn commit_file(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
    ) -> Result<(), StorageError> {
        let sha = self.fetch_sha(path).await?;

        let mut body = json!({
            "message": message,
            "content": BASE64.encode(bytes),
            "branch": self.branch,
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }

        let response = self
            .client
            .put(self.contents_url(path))
            .bearer_auth(&self.token)
            .header(header::USER_AGENT, USER_AGENT)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(StorageError::ProviderError(format!(
                "Commit of {} failed with status {}: {}",
                path, status, error_text
            )));
        }

        Ok(())
    }

    async fn delete_object(&self, path: &str) -> DeleteOutcome {
        match self.try_delete(path).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Failed to delete {} from GitHub: {}", path, e);
                DeleteOutcome::Failed
            }
        }
    }

    async fn try_delete(&self, path: &str) -> Result<DeleteOutcome, StorageError> {
        let Some(sha) = self.fetch_sha(path).await? else {
            debug!("File not found on GitHub: {}", path);
            return Ok(DeleteOutcome::AlreadyAbsent);
        };

        let body = json!({
            "message": format!("Delete: {}", path),
            "sha": sha,
            "branch": self.branch,
        });

        let response = self
            .client
            .delete(self.contents_url(path))
            .bearer_auth(&self.token)
            .header(header::USER_AGENT, USER_AGENT)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::ProviderError(format!(
                "Delete of {} failed with status: {}",
                path,
                response.status()
            )));
        }

        Ok(DeleteOutcome::Deleted)
    }
}

#[async_trait]
impl StorageProvider for GithubStorageProvider {
    async fn upload(
        &self,
        file: UploadFile,
        thumbnail: Option<UploadFile>,
    ) -> Result<UploadResult, StorageError> {
        let file_path = self.build_path(&file.filename, file.subfolder.as_deref());
        self.commit_file(&file_path, &file.bytes, &format!("Upload: {}", file.filename))
            .await
            .map_err(|e| StorageError::upload_failed("github", e))?;

        let mut result = UploadResult {
            url: self.url_for(&file_path),
            key: file_path,
            thumbnail_url: None,
            thumbnail_key: None,
        };

        // Separate commit per file: if this one fails the primary commit
        // above stays in the repository and the caller reconciles.
        if let Some(thumb) = thumbnail {
            let thumb_path = self.build_path(&thumb.filename, thumb.subfolder.as_deref());
            self.commit_file(
                &thumb_path,
                &thumb.bytes,
                &format!("Upload thumbnail: {}", thumb.filename),
            )
            .await
            .map_err(|e| StorageError::upload_failed("github", e))?;
            result.thumbnail_url = Some(self.url_for(&thumb_path));
            result.thumbnail_key = Some(thumb_path);
        }

        Ok(result)
    }

    async fn delete(&self, key: &str, thumbnail_key: Option<&str>) -> DeleteOutcome {
        let outcome = self.delete_object(key).await;
        if let Some(thumb_key) = thumbnail_key {
            self.delete_object(thumb_key).await;
        }
        outcome
    }

    fn url_for(&self, key: &str) -> String {
        match self.access_method {
            GithubAccessMethod::Raw => format!(
                "https://raw.githubusercontent.com/{}/{}/{}/{}",
                self.owner, self.repo, self.branch, key
            ),
            GithubAccessMethod::Jsdelivr => format!(
                "https://cdn.jsdelivr.net/gh/{}/{}@{}/{}",
                self.owner, self.repo, self.branch, key
            ),
            GithubAccessMethod::Pages => {
                // Validated at construction.
                let base = self
                    .pages_url
                    .as_deref()
                    .unwrap_or_default()
                    .trim_end_matches('/');
                format!("{}/{}", base, key)
            }
        }
    }

    fn name(&self) -> &'static str {
        "github"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> StorageConfig {
        let mut config = StorageConfig::default();
        config.github_token = Some("ghp_test".to_string());
        config.github_repo = Some("octo/gallery".to_string());
        config
    }

    #[test]
    fn rejects_missing_token() {
        let mut config = base_config();
        config.github_token = None;
        let err = GithubStorageProvider::new(&config).unwrap_err();
        assert_eq!(err.code(), "GITHUB_TOKEN_MISSING");
    }

    #[test]
    fn rejects_repo_without_owner_separator() {
        let mut config = base_config();
        config.github_repo = Some("just-a-name".to_string());
        let err = GithubStorageProvider::new(&config).unwrap_err();
        assert_eq!(err.code(), "GITHUB_REPO_INVALID");
    }

    #[test]
    fn rejects_pages_method_without_pages_url() {
        let mut config = base_config();
        config.github_access_method = Some(GithubAccessMethod::Pages);
        let err = GithubStorageProvider::new(&config).unwrap_err();
        assert_eq!(err.code(), "GITHUB_PAGES_URL_MISSING");
    }

    #[test]
    fn applies_defaults_for_path_branch_and_method() {
        let provider = GithubStorageProvider::new(&base_config()).unwrap();
        assert_eq!(provider.base_path, "uploads");
        assert_eq!(provider.branch, "main");
        assert_eq!(provider.access_method, GithubAccessMethod::Jsdelivr);
    }

    #[test]
    fn build_path_joins_segments() {
        let provider = GithubStorageProvider::new(&base_config()).unwrap();
        assert_eq!(provider.build_path("a.jpg", None), "uploads/a.jpg");
        assert_eq!(
            provider.build_path("a.jpg", Some("2024/06")),
            "uploads/2024/06/a.jpg"
        );
    }

    #[test]
    fn build_path_collapses_slash_runs() {
        let mut config = base_config();
        config.github_path = Some("uploads/".to_string());
        let provider = GithubStorageProvider::new(&config).unwrap();
        assert_eq!(
            provider.build_path("a.jpg", Some("/2024//06/")),
            "uploads/2024/06/a.jpg"
        );
    }

    #[test]
    fn url_for_raw_method() {
        let mut config = base_config();
        config.github_access_method = Some(GithubAccessMethod::Raw);
        let provider = GithubStorageProvider::new(&config).unwrap();
        assert_eq!(
            provider.url_for("uploads/a.jpg"),
            "https://raw.githubusercontent.com/octo/gallery/main/uploads/a.jpg"
        );
    }

    #[test]
    fn url_for_jsdelivr_method() {
        let provider = GithubStorageProvider::new(&base_config()).unwrap();
        assert_eq!(
            provider.url_for("uploads/a.jpg"),
            "https://cdn.jsdelivr.net/gh/octo/gallery@main/uploads/a.jpg"
        );
    }

    #[test]
    fn url_for_pages_method_strips_trailing_slashes() {
        let mut config = base_config();
        config.github_access_method = Some(GithubAccessMethod::Pages);
        config.github_pages_url = Some("https://octo.github.io/gallery//".to_string());
        let provider = GithubStorageProvider::new(&config).unwrap();
        assert_eq!(
            provider.url_for("uploads/a.jpg"),
            "https://octo.github.io/gallery/uploads/a.jpg"
        );
    }

    #[test]
    fn url_for_respects_configured_branch() {
        let mut config = base_config();
        config.github_branch = Some("cdn".to_string());
        let provider = GithubStorageProvider::new(&config).unwrap();
        assert_eq!(
            provider.url_for("uploads/a.jpg"),
            "https://cdn.jsdelivr.net/gh/octo/gallery@cdn/uploads/a.jpg"
        );
    }
}
