use std::io;
use std::path::{Path, PathBuf};

/// Persists uploaded audio so native backends can read it from disk.
#[async_trait::async_trait]
pub trait UploadStore: Send + Sync {
    /// Writes `data` and returns the path of the stored file.
    async fn save(&self, data: &[u8], filename: Option<&str>) -> Result<PathBuf, UploadStoreError>;

    async fn remove(&self, path: &Path) -> Result<(), UploadStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum UploadStoreError {
    #[error("upload failed: {0}")]
    WriteFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
