use std::path::Path;

use crate::domain::{EngineName, LoadKey, TranscriptionOptions};

use super::native_model::{ModelInterface, NativeModel, Placement, RawOutput};
use super::speech_engine::EngineError;

/// The single model an adapter holds. Key and model are swapped together as
/// one immutable record, so a reader can never pair a key with the wrong
/// weights.
pub struct ResidentModel {
    pub key: LoadKey,
    pub interface: ModelInterface,
    pub placement: Placement,
    model: Box<dyn NativeModel>,
}

impl std::fmt::Debug for ResidentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResidentModel")
            .field("key", &self.key)
            .field("interface", &self.interface)
            .field("placement", &self.placement)
            .finish_non_exhaustive()
    }
}

impl ResidentModel {
    pub fn new(key: LoadKey, placement: Placement, model: Box<dyn NativeModel>) -> Self {
        Self {
            key,
            interface: model.interface(),
            placement,
            model,
        }
    }

    /// Dispatches on the interface fixed at load time.
    pub fn run(
        &self,
        engine: EngineName,
        audio_path: &Path,
        options: &TranscriptionOptions,
    ) -> Result<RawOutput, EngineError> {
        let output = match self.interface {
            ModelInterface::DirectTranscribe => {
                self.model
                    .transcribe(audio_path, options.language(), &options.extra)
            }
            ModelInterface::Callable => self.model.invoke(audio_path, &options.extra),
            ModelInterface::Unsupported => {
                return Err(EngineError::UnsupportedInterface { engine });
            }
        };

        output.map_err(|e| EngineError::Transcription(format!("{}: {}", engine, e)))
    }
}
