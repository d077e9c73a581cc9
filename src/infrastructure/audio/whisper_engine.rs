use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::application::ports::{EngineError, ModelLoader, ResidentModel, SpeechEngine};
use crate::application::services::{ModelSlot, SegmentShape, normalize_output};
use crate::domain::{ComputeDevice, EngineName, TranscriptionOptions, TranscriptionResult};

const DEFAULT_TASK: &str = "transcribe";

pub struct WhisperEngine {
    slot: ModelSlot,
}

impl WhisperEngine {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            slot: ModelSlot::new(EngineName::Whisper, loader),
        }
    }
}

impl SpeechEngine for WhisperEngine {
    fn name(&self) -> EngineName {
        EngineName::Whisper
    }

    fn load(
        &self,
        model_id: &str,
        device: ComputeDevice,
    ) -> Result<Arc<ResidentModel>, EngineError> {
        self.slot.load(model_id, device)
    }

    fn transcribe(
        &self,
        audio_path: &Path,
        options: &TranscriptionOptions,
    ) -> Result<TranscriptionResult, EngineError> {
        self.transcribe_with(&*self.slot.snapshot()?, audio_path, options)
    }

    fn transcribe_with(
        &self,
        resident: &ResidentModel,
        audio_path: &Path,
        options: &TranscriptionOptions,
    ) -> Result<TranscriptionResult, EngineError> {
        let raw = resident.run(EngineName::Whisper, audio_path, options)?;

        let task = raw
            .get("task")
            .and_then(Value::as_str)
            .or_else(|| options.extra.get("task").and_then(Value::as_str))
            .unwrap_or(DEFAULT_TASK)
            .to_string();

        let mut result = normalize_output(raw, options.language(), SegmentShape::Canonical);
        result
            .meta
            .insert("interface".into(), resident.interface.as_str().into());
        result.meta.insert("task".into(), task.into());

        Ok(result)
    }
}
