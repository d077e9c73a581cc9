use std::path::Path;
use std::sync::Arc;

use crate::domain::{ComputeDevice, EngineName, TranscriptionOptions, TranscriptionResult};

use super::native_model::NativeError;
use super::resident_model::ResidentModel;

/// Contract every ASR adapter satisfies. Both calls block on native work.
pub trait SpeechEngine: Send + Sync {
    fn name(&self) -> EngineName;

    /// Makes `(model_id, device)` resident and returns that exact record.
    /// Constructs nothing when it already is resident.
    fn load(
        &self,
        model_id: &str,
        device: ComputeDevice,
    ) -> Result<Arc<ResidentModel>, EngineError>;

    /// Runs on whatever model is resident right now.
    fn transcribe(
        &self,
        audio_path: &Path,
        options: &TranscriptionOptions,
    ) -> Result<TranscriptionResult, EngineError>;

    /// Runs on `resident`, typically the record `load` returned, regardless
    /// of what has been loaded since.
    fn transcribe_with(
        &self,
        resident: &ResidentModel,
        audio_path: &Path,
        options: &TranscriptionOptions,
    ) -> Result<TranscriptionResult, EngineError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unknown engine '{name}', use one of: {}", format_names(.valid))]
    UnknownEngine {
        name: String,
        valid: Vec<EngineName>,
    },
    #[error("failed to load model '{model_id}' on device={device}: {source}")]
    Load {
        model_id: String,
        device: ComputeDevice,
        #[source]
        source: NativeError,
    },
    #[error("{engine} model is not loaded")]
    NotLoaded { engine: EngineName },
    #[error("{engine}: unsupported model interface (no transcribe() and not callable)")]
    UnsupportedInterface { engine: EngineName },
    #[error("{0}")]
    Transcription(String),
}

impl EngineError {
    /// Stable kind name surfaced to clients as the `<ErrorKind>` prefix.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::UnknownEngine { .. } => "UnknownEngineError",
            EngineError::Load { .. } => "LoadError",
            EngineError::NotLoaded { .. } => "NotLoadedError",
            EngineError::UnsupportedInterface { .. } => "UnsupportedInterfaceError",
            EngineError::Transcription(_) => "TranscriptionError",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::UnknownEngine { .. })
    }
}

fn format_names(names: &[EngineName]) -> String {
    names
        .iter()
        .map(EngineName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
