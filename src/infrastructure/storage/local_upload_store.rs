use std::path::{Path, PathBuf};

use crate::application::ports::{UploadStore, UploadStoreError};

const DEFAULT_EXTENSION: &str = ".bin";

/// Stores uploads as `<base>/<uuid><ext>` on the local filesystem.
pub struct LocalUploadStore {
    base_path: PathBuf,
}

impl LocalUploadStore {
    pub fn new(base_path: PathBuf) -> Result<Self, UploadStoreError> {
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_name(filename: Option<&str>) -> String {
        let extension = filename
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

        format!("{}{}", uuid::Uuid::new_v4().simple(), extension)
    }
}

#[async_trait::async_trait]
impl UploadStore for LocalUploadStore {
    async fn save(&self, data: &[u8], filename: Option<&str>) -> Result<PathBuf, UploadStoreError> {
        let path = self.base_path.join(Self::file_name(filename));

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| UploadStoreError::WriteFailed(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), bytes = data.len(), "Upload stored");
        Ok(path)
    }

    async fn remove(&self, path: &Path) -> Result<(), UploadStoreError> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| UploadStoreError::DeleteFailed(format!("{}: {}", path.display(), e)))
    }
}
