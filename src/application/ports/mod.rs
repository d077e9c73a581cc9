mod acceleration_probe;
mod native_model;
mod resident_model;
mod speech_engine;
mod upload_store;

pub use acceleration_probe::AccelerationProbe;
pub use native_model::{ModelInterface, ModelLoader, NativeError, NativeModel, Placement, RawOutput};
pub use resident_model::ResidentModel;
pub use speech_engine::{EngineError, SpeechEngine};
pub use upload_store::{UploadStore, UploadStoreError};
