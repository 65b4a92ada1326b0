use async_trait::async_trait;
use aws_sdk_s3::{
    config::{BehaviorVersion, Credentials, Region},
    primitives::ByteStream,
    Client,
};
use tracing::warn;

use crate::{
    application::services::{DeleteOutcome, StorageProvider},
    domain::{
        config::storage::StorageConfig,
        models::upload::{UploadFile, UploadResult},
    },
    services::error::StorageError,
};

/// S3-compatible object storage (Cloudflare R2). Keys are flat
/// subfolder/filename paths; public access goes through the configured
/// public base URL or falls back to path-style endpoint URLs.
pub struct R2StorageProvider {
    client: Client,
    bucket: String,
    endpoint: String,
    public_url: Option<String>,
}

impl R2StorageProvider {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let access_key_id = config
            .r2_access_key_id
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or(StorageError::R2CredentialsMissing)?;
        let secret_access_key = config
            .r2_secret_access_key
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or(StorageError::R2CredentialsMissing)?;
        let bucket = config
            .r2_bucket
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or(StorageError::R2BucketMissing)?;
        let endpoint = config
            .r2_endpoint
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or(StorageError::R2EndpointMissing)?
            .trim_end_matches('/')
            .to_string();

        let credentials = Credentials::new(access_key_id, secret_access_key, None, None, "settings");
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("auto"))
            .endpoint_url(&endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: bucket.to_string(),
            endpoint,
            public_url: config
                .r2_public_url
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| v.trim_end_matches('/').to_string()),
        })
    }

    fn build_key(&self, filename: &str, subfolder: Option<&str>) -> String {
        match subfolder.map(|s| s.trim_matches('/')).filter(|s| !s.is_empty()) {
            Some(sub) => format!("{}/{}", sub, filename),
            None => filename.to_string(),
        }
    }

    async fn put_object(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::upload_failed("r2", e))?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> DeleteOutcome {
        // S3-style deletes succeed whether or not the key exists, so a
        // missing object is indistinguishable from a removed one here.
        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => DeleteOutcome::Deleted,
            Err(e) => {
                warn!("Failed to delete {} from R2: {}", key, e);
                DeleteOutcome::Failed
            }
        }
    }
}

#[async_trait]
impl StorageProvider for R2StorageProvider {
    async fn upload(
        &self,
        file: UploadFile,
        thumbnail: Option<UploadFile>,
    ) -> Result<UploadResult, StorageError> {
        let key = self.build_key(&file.filename, file.subfolder.as_deref());
        self.put_object(&key, file.bytes).await?;

        let mut result = UploadResult {
            url: self.url_for(&key),
            key,
            thumbnail_url: None,
            thumbnail_key: None,
        };

        if let Some(thumb) = thumbnail {
            let thumb_key = self.build_key(&thumb.filename, thumb.subfolder.as_deref());
            self.put_object(&thumb_key, thumb.bytes).await?;
            result.thumbnail_url = Some(self.url_for(&thumb_key));
            result.thumbnail_key = Some(thumb_key);
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
        match &self.public_url {
            Some(base) => format!("{}/{}", base, key),
            None => format!("{}/{}/{}", self.endpoint, self.bucket, key),
        }
    }

    fn name(&self) -> &'static str {
        "r2"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> StorageConfig {
        let mut config = StorageConfig::default();
        config.r2_access_key_id = Some("key".to_string());
        config.r2_secret_access_key = Some("secret".to_string());
        config.r2_bucket = Some("photos".to_string());
        config.r2_endpoint = Some("https://acc.r2.cloudflarestorage.com".to_string());
        config
    }

    #[test]
    fn rejects_missing_credentials() {
        let mut config = base_config();
        config.r2_secret_access_key = None;
        let err = R2StorageProvider::new(&config).unwrap_err();
        assert_eq!(err.code(), "R2_CREDENTIALS_MISSING");
    }

    #[test]
    fn rejects_missing_bucket() {
        let mut config = base_config();
        config.r2_bucket = Some(String::new());
        let err = R2StorageProvider::new(&config).unwrap_err();
        assert_eq!(err.code(), "R2_BUCKET_MISSING");
    }

    #[test]
    fn rejects_missing_endpoint() {
        let mut config = base_config();
        config.r2_endpoint = None;
        let err = R2StorageProvider::new(&config).unwrap_err();
        assert_eq!(err.code(), "R2_ENDPOINT_MISSING");
    }

    #[test]
    fn url_for_prefers_public_base() {
        let mut config = base_config();
        config.r2_public_url = Some("https://cdn.example.com/".to_string());
        let provider = R2StorageProvider::new(&config).unwrap();
        assert_eq!(
            provider.url_for("2024/a.jpg"),
            "https://cdn.example.com/2024/a.jpg"
        );
    }

    #[test]
    fn url_for_falls_back_to_path_style_endpoint() {
        let provider = R2StorageProvider::new(&base_config()).unwrap();
        assert_eq!(
            provider.url_for("a.jpg"),
            "https://acc.r2.cloudflarestorage.com/photos/a.jpg"
        );
    }

    #[test]
    fn build_key_trims_subfolder_slashes() {
        let provider = R2StorageProvider::new(&base_config()).unwrap();
        assert_eq!(provider.build_key("a.jpg", Some("/2024/")), "2024/a.jpg");
        assert_eq!(provider.build_key("a.jpg", None), "a.jpg");
    }
}
