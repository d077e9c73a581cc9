mod device_resolver;
mod engine_registry;
mod model_slot;
mod output_normalizer;
mod transcription_service;

pub use device_resolver::resolve_device;
pub use engine_registry::EngineRegistry;
pub use model_slot::ModelSlot;
pub use output_normalizer::{SegmentShape, normalize_output};
pub use transcription_service::{
    EngineDefaults, TranscribeRequest, TranscriptionService,
};
