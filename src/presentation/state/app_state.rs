use std::sync::Arc;

use crate::application::ports::UploadStore;
use crate::application::services::TranscriptionService;

#[derive(Clone)]
pub struct AppState {
    pub transcription_service: Arc<TranscriptionService>,
    pub upload_store: Arc<dyn UploadStore>,
    /// Request body cap for `/transcribe`.
    pub max_upload_bytes: usize,
}
