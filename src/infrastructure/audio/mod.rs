pub mod audio_decoder;
mod candle_acceleration_probe;
mod candle_whisper_model;
mod gigaam_engine;
mod mel_filters;
mod sherpa_gigaam_model;
mod speech_engine_factory;
mod whisper_engine;

pub use candle_acceleration_probe::CandleAccelerationProbe;
pub use candle_whisper_model::{CandleWhisperLoader, CandleWhisperModel};
pub use gigaam_engine::GigaAmEngine;
pub use sherpa_gigaam_model::{GigaAmRecognizerConfig, SherpaGigaAmLoader};
pub use speech_engine_factory::{BackendConfig, SpeechEngineFactory};
pub use whisper_engine::WhisperEngine;
