use std::path::Path;
use std::sync::Arc;

use crate::application::ports::{EngineError, ModelLoader, Placement, ResidentModel, SpeechEngine};
use crate::application::services::{ModelSlot, SegmentShape, normalize_output};
use crate::domain::{ComputeDevice, EngineName, TranscriptionOptions, TranscriptionResult};

pub struct GigaAmEngine {
    slot: ModelSlot,
}

impl GigaAmEngine {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            slot: ModelSlot::new(EngineName::GigaAm, loader),
        }
    }
}

/// Which SDK shape the resident handle turned out to have.
fn sdk_variant(placement: Placement) -> &'static str {
    match placement {
        Placement::Placed => "device-placed",
        Placement::Skipped => "no-placement",
    }
}

impl SpeechEngine for GigaAmEngine {
    fn name(&self) -> EngineName {
        EngineName::GigaAm
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
        let raw = resident.run(EngineName::GigaAm, audio_path, options)?;

        let mut result = normalize_output(raw, options.language(), SegmentShape::Verbatim);
        result
            .meta
            .insert("interface".into(), resident.interface.as_str().into());
        result
            .meta
            .insert("sdk_variant".into(), sdk_variant(resident.placement).into());

        Ok(result)
    }
}
