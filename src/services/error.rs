use thiserror::Error;

use crate::application::error::ApplicationError;

/// Errors raised by the storage backends. Configuration variants are
/// detected at construction time, before any I/O happens.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("GitHub token is required")]
    GithubTokenMissing,

    #[error("GitHub repo must be in \"owner/repo\" format")]
    GithubRepoInvalid,

    #[error("GitHub Pages URL is required when using the pages access method")]
    GithubPagesUrlMissing,

    #[error("R2 credentials are required")]
    R2CredentialsMissing,

    #[error("R2 bucket is required")]
    R2BucketMissing,

    #[error("R2 endpoint is required")]
    R2EndpointMissing,

    #[error("unknown storage provider: {0}")]
    UnknownProvider(String),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("failed to upload to {provider}")]
    UploadFailed {
        provider: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("storage provider error: {0}")]
    ProviderError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn upload_failed(
        provider: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StorageError::UploadFailed {
            provider,
            source: Box::new(source),
        }
    }

    /// Machine-readable code, stable across message changes.
    pub fn code(&self) -> &'static str {
        match self {
            StorageError::GithubTokenMissing => "GITHUB_TOKEN_MISSING",
            StorageError::GithubRepoInvalid => "GITHUB_REPO_INVALID",
            StorageError::GithubPagesUrlMissing => "GITHUB_PAGES_URL_MISSING",
            StorageError::R2CredentialsMissing => "R2_CREDENTIALS_MISSING",
            StorageError::R2BucketMissing => "R2_BUCKET_MISSING",
            StorageError::R2EndpointMissing => "R2_ENDPOINT_MISSING",
            StorageError::UnknownProvider(_) => "UNKNOWN_PROVIDER",
            StorageError::NotFound(_) => "NOT_FOUND",
            StorageError::UploadFailed { provider, .. } => match *provider {
                "github" => "GITHUB_UPLOAD_FAILED",
                "r2" => "R2_UPLOAD_FAILED",
                "local" => "LOCAL_UPLOAD_FAILED",
                _ => "UPLOAD_FAILED",
            },
            StorageError::NetworkError(_) => "NETWORK_ERROR",
            StorageError::ProviderError(_) => "PROVIDER_ERROR",
            StorageError::Io(_) => "IO_ERROR",
        }
    }
}

impl From<StorageError> for ApplicationError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound(_) => ApplicationError::NotFound,
            other => ApplicationError::InternalError(format!(
                "Storage error [{}]: {}",
                other.code(),
                other
            )),
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            StorageError::NetworkError("Request timeout".to_string())
        } else if error.is_connect() {
            StorageError::NetworkError(format!("Connection failed: {}", error))
        } else if let Some(status) = error.status() {
            match status.as_u16() {
                404 => StorageError::NotFound(error.to_string()),
                _ => StorageError::ProviderError(error.to_string()),
            }
        } else {
            StorageError::ProviderError(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_expose_stable_codes() {
        assert_eq!(
            StorageError::GithubTokenMissing.code(),
            "GITHUB_TOKEN_MISSING"
        );
        assert_eq!(
            StorageError::GithubRepoInvalid.code(),
            "GITHUB_REPO_INVALID"
        );
        assert_eq!(
            StorageError::GithubPagesUrlMissing.code(),
            "GITHUB_PAGES_URL_MISSING"
        );
        assert_eq!(StorageError::R2BucketMissing.code(), "R2_BUCKET_MISSING");
    }

    #[test]
    fn upload_failed_code_follows_provider() {
        let io = std::io::Error::other("boom");
        let err = StorageError::upload_failed("github", io);
        assert_eq!(err.code(), "GITHUB_UPLOAD_FAILED");
    }

    #[test]
    fn upload_failed_preserves_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StorageError::upload_failed("local", io);
        let source = std::error::Error::source(&err).expect("cause kept");
        assert!(source.to_string().contains("denied"));
    }
}
