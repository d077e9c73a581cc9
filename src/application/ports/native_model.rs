use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};

use crate::domain::ComputeDevice;

/// Whatever shape a native backend produces: a bare string, a map, or
/// something else entirely. Normalization happens in the adapter.
pub type RawOutput = Value;

/// Which entry point a native handle exposes. Fixed once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelInterface {
    /// `transcribe(audio, language, options)`
    DirectTranscribe,
    /// The handle is a plain function of `(audio, options)`.
    Callable,
    Unsupported,
}

impl ModelInterface {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelInterface::DirectTranscribe => "direct_transcribe",
            ModelInterface::Callable => "callable",
            ModelInterface::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for ModelInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of asking a freshly built handle to move to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Placed,
    /// The handle has no placement operation; it stays where it was built.
    Skipped,
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Placed => "placed",
            Placement::Skipped => "skipped",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NativeError {
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error("model construction failed: {0}")]
    Construction(String),
    #[error("device placement failed: {0}")]
    Placement(String),
    #[error("audio decoding failed: {0}")]
    Decoding(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("entry point not supported: {0}")]
    NotSupported(&'static str),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A constructed native model. Implementors override only the entry points
/// they actually have and report them through [`NativeModel::interface`].
pub trait NativeModel: Send + Sync {
    fn interface(&self) -> ModelInterface;

    fn place_on(&mut self, _device: ComputeDevice) -> Result<Placement, NativeError> {
        Ok(Placement::Skipped)
    }

    fn transcribe(
        &self,
        _audio_path: &Path,
        _language: Option<&str>,
        _options: &Map<String, Value>,
    ) -> Result<RawOutput, NativeError> {
        Err(NativeError::NotSupported("transcribe"))
    }

    fn invoke(
        &self,
        _audio_path: &Path,
        _options: &Map<String, Value>,
    ) -> Result<RawOutput, NativeError> {
        Err(NativeError::NotSupported("invoke"))
    }
}

/// Builds native models from an identifier. One loader per backend SDK.
pub trait ModelLoader: Send + Sync {
    fn load(&self, model_id: &str) -> Result<Box<dyn NativeModel>, NativeError>;
}
