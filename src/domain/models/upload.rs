/// A file handed to a storage backend. Built per request; never persisted.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Optional subfolder under the provider's base path.
    pub subfolder: Option<String>,
}

impl UploadFile {
    pub fn new(filename: String, bytes: Vec<u8>) -> Self {
        Self {
            filename,
            bytes,
            subfolder: None,
        }
    }

    pub fn with_subfolder(filename: String, bytes: Vec<u8>, subfolder: Option<String>) -> Self {
        Self {
            filename,
            bytes,
            subfolder,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// What a successful upload hands back to the caller. `key` (and
/// `thumbnail_key`) are the backend identifiers the caller must persist to
/// be able to delete the objects later.
#[derive(Debug, Clone)]
pub struct UploadResult {
    pub url: String,
    pub key: String,
    pub thumbnail_url: Option<String>,
    pub thumbnail_key: Option<String>,
}
