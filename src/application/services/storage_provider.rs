use async_trait::async_trait;

use crate::{domain::models::upload::{UploadFile, UploadResult}, services::StorageError};

/// What happened to a key during a best-effort delete. `delete` never
/// returns an error: storage flakiness must not block deletion of the
/// database record that owns the keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The object was already gone. Treated as success.
    AlreadyAbsent,
    /// The backend failed; the error was logged and swallowed.
    Failed,
}

#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Write `file` (and `thumbnail`, if given) to the backend. The
    /// thumbnail is written after the primary file; if it fails the error
    /// propagates and the primary stays stored. No rollback is attempted.
    async fn upload(
        &self,
        file: UploadFile,
        thumbnail: Option<UploadFile>,
    ) -> Result<UploadResult, StorageError>;

    /// Best-effort removal of `key` and `thumbnail_key`. A missing object
    /// counts as success. Returns the primary key's outcome.
    async fn delete(&self, key: &str, thumbnail_key: Option<&str>) -> DeleteOutcome;

    /// Derive the public URL for a key from static configuration only.
    /// No I/O.
    fn url_for(&self, key: &str) -> String;

    /// Discriminant persisted alongside photo records ("local", "github",
    /// "r2").
    fn name(&self) -> &'static str;
}
