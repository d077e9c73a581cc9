use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::SpeechEngine;
use crate::application::services::EngineRegistry;
use crate::domain::EngineName;

use super::candle_whisper_model::CandleWhisperLoader;
use super::gigaam_engine::GigaAmEngine;
use super::sherpa_gigaam_model::{GigaAmRecognizerConfig, SherpaGigaAmLoader};
use super::whisper_engine::WhisperEngine;

/// What the native loaders need to know about the local environment.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub gigaam_models_dir: PathBuf,
    pub gigaam: GigaAmRecognizerConfig,
}

pub struct SpeechEngineFactory;

impl SpeechEngineFactory {
    pub fn create(engine: EngineName, config: &BackendConfig) -> Arc<dyn SpeechEngine> {
        match engine {
            EngineName::Whisper => Arc::new(WhisperEngine::new(Arc::new(CandleWhisperLoader))),
            EngineName::GigaAm => {
                let loader =
                    SherpaGigaAmLoader::new(&config.gigaam_models_dir, config.gigaam.clone());
                Arc::new(GigaAmEngine::new(Arc::new(loader)))
            }
        }
    }

    /// One adapter per known engine. Nothing is loaded until first use.
    pub fn registry(config: &BackendConfig) -> EngineRegistry {
        EngineRegistry::new(
            EngineName::ALL
                .iter()
                .map(|engine| Self::create(*engine, config)),
        )
    }
}
