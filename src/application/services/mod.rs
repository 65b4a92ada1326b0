pub mod password;
pub mod storage_provider;

pub use storage_provider::{DeleteOutcome, StorageProvider};
