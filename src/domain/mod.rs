mod compute_device;
mod engine_name;
mod load_key;
mod segment;
mod transcription;

pub use compute_device::ComputeDevice;
pub use engine_name::EngineName;
pub use load_key::LoadKey;
pub use segment::{Segment, Segments};
pub use transcription::{
    EngineCatalog, TranscribeResponse, TranscriptionOptions, TranscriptionResult,
};
