use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    application::services::{DeleteOutcome, StorageProvider},
    domain::models::upload::{UploadFile, UploadResult},
    services::error::StorageError,
};

/// URL prefix under which a separate static file server exposes the
/// upload root.
const PUBLIC_BASE: &str = "/uploads";

/// Stores uploads under an explicit root directory. The root is passed in
/// at construction; nothing here depends on the process working directory.
pub struct LocalStorageProvider {
    root: PathBuf,
}

impl LocalStorageProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn build_key(&self, filename: &str, subfolder: Option<&str>) -> String {
        match subfolder {
            Some(sub) => {
                let sub = sub.trim_matches('/');
                if sub.is_empty() {
                    filename.to_string()
                } else {
                    format!("{}/{}", sub, filename)
                }
            }
            None => filename.to_string(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    async fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    async fn remove_file(&self, key: &str) -> DeleteOutcome {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => DeleteOutcome::Deleted,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("File already absent: {}", path.display());
                DeleteOutcome::AlreadyAbsent
            }
            Err(e) => {
                warn!("Failed to delete {}: {}", path.display(), e);
                DeleteOutcome::Failed
            }
        }
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    async fn upload(
        &self,
        file: UploadFile,
        thumbnail: Option<UploadFile>,
    ) -> Result<UploadResult, StorageError> {
        let key = self.build_key(&file.filename, file.subfolder.as_deref());
        self.write_file(&self.path_for(&key), &file.bytes)
            .await
            .map_err(|e| StorageError::upload_failed("local", e))?;

        let mut result = UploadResult {
            url: self.url_for(&key),
            key,
            thumbnail_url: None,
            thumbnail_key: None,
        };

        if let Some(thumb) = thumbnail {
            let thumb_key = self.build_key(&thumb.filename, thumb.subfolder.as_deref());
            self.write_file(&self.path_for(&thumb_key), &thumb.bytes)
                .await
                .map_err(|e| StorageError::upload_failed("local", e))?;
            result.thumbnail_url = Some(self.url_for(&thumb_key));
            result.thumbnail_key = Some(thumb_key);
        }

        Ok(result)
    }

    async fn delete(&self, key: &str, thumbnail_key: Option<&str>) -> DeleteOutcome {
        let outcome = self.remove_file(key).await;
        if let Some(thumb_key) = thumbnail_key {
            self.remove_file(thumb_key).await;
        }
        outcome
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", PUBLIC_BASE, key)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> (tempfile::TempDir, LocalStorageProvider) {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path());
        (dir, provider)
    }

    #[tokio::test]
    async fn upload_writes_file_and_returns_relative_url() {
        let (dir, provider) = provider();

        let file = UploadFile::new("a.jpg".to_string(), vec![1, 2, 3]);
        let result = provider.upload(file, None).await.unwrap();

        assert_eq!(result.key, "a.jpg");
        assert_eq!(result.url, "/uploads/a.jpg");
        assert_eq!(std::fs::read(dir.path().join("a.jpg")).unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn upload_creates_subfolders() {
        let (dir, provider) = provider();

        let file = UploadFile::with_subfolder(
            "a.jpg".to_string(),
            vec![7],
            Some("2024/06".to_string()),
        );
        let result = provider.upload(file, None).await.unwrap();

        assert_eq!(result.key, "2024/06/a.jpg");
        assert_eq!(result.url, "/uploads/2024/06/a.jpg");
        assert!(dir.path().join("2024/06/a.jpg").exists());
    }

    #[tokio::test]
    async fn upload_stores_thumbnail_beside_primary() {
        let (dir, provider) = provider();

        let file = UploadFile::new("a.jpg".to_string(), vec![1]);
        let thumb = UploadFile::new("thumb-a.jpg".to_string(), vec![2]);
        let result = provider.upload(file, Some(thumb)).await.unwrap();

        assert_eq!(result.thumbnail_key.as_deref(), Some("thumb-a.jpg"));
        assert_eq!(result.thumbnail_url.as_deref(), Some("/uploads/thumb-a.jpg"));
        assert!(dir.path().join("thumb-a.jpg").exists());
    }

    #[tokio::test]
    async fn thumbnail_failure_propagates_and_keeps_primary() {
        let (dir, provider) = provider();

        let file = UploadFile::new("a.jpg".to_string(), vec![1]);
        // An empty filename resolves to the root directory itself, so the
        // thumbnail write must fail after the primary succeeded.
        let thumb = UploadFile::new(String::new(), vec![2]);

        let err = provider.upload(file, Some(thumb)).await.unwrap_err();
        assert_eq!(err.code(), "LOCAL_UPLOAD_FAILED");
        assert!(dir.path().join("a.jpg").exists());
    }

    #[tokio::test]
    async fn concurrent_uploads_to_distinct_keys_do_not_interfere() {
        let (dir, provider) = provider();

        let a = provider.upload(UploadFile::new("a.jpg".to_string(), vec![1; 64]), None);
        let b = provider.upload(UploadFile::new("b.jpg".to_string(), vec![2; 64]), None);
        let (a, b) = tokio::join!(a, b);

        assert_eq!(a.unwrap().key, "a.jpg");
        assert_eq!(b.unwrap().key, "b.jpg");
        assert_eq!(std::fs::read(dir.path().join("a.jpg")).unwrap(), vec![1; 64]);
        assert_eq!(std::fs::read(dir.path().join("b.jpg")).unwrap(), vec![2; 64]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, provider) = provider();

        let file = UploadFile::new("a.jpg".to_string(), vec![1]);
        let result = provider.upload(file, None).await.unwrap();

        assert_eq!(provider.delete(&result.key, None).await, DeleteOutcome::Deleted);
        assert_eq!(
            provider.delete(&result.key, None).await,
            DeleteOutcome::AlreadyAbsent
        );
    }

    #[tokio::test]
    async fn delete_of_unknown_key_is_success() {
        let (_dir, provider) = provider();
        assert_eq!(
            provider.delete("never-existed.jpg", None).await,
            DeleteOutcome::AlreadyAbsent
        );
    }

    #[tokio::test]
    async fn delete_removes_thumbnail_too() {
        let (dir, provider) = provider();

        let file = UploadFile::new("a.jpg".to_string(), vec![1]);
        let thumb = UploadFile::new("thumb-a.jpg".to_string(), vec![2]);
        let result = provider.upload(file, Some(thumb)).await.unwrap();

        provider
            .delete(&result.key, result.thumbnail_key.as_deref())
            .await;
        assert!(!dir.path().join("a.jpg").exists());
        assert!(!dir.path().join("thumb-a.jpg").exists());
    }
}
