use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};

use crate::application::ports::{AccelerationProbe, EngineError, NativeError};
use crate::domain::{
    ComputeDevice, EngineCatalog, EngineName, TranscribeResponse, TranscriptionOptions,
};

use super::device_resolver::resolve_device;
use super::engine_registry::EngineRegistry;

/// Values the service falls back to when a request leaves them out.
#[derive(Debug, Clone)]
pub struct EngineDefaults {
    pub device: String,
    pub models: BTreeMap<EngineName, String>,
}

#[derive(Debug, Clone)]
pub struct TranscribeRequest {
    pub engine: String,
    pub model: Option<String>,
    pub device: Option<String>,
    pub language: Option<String>,
    pub audio_path: PathBuf,
    pub options: Map<String, Value>,
}

impl TranscribeRequest {
    pub fn new(engine: impl Into<String>, audio_path: impl Into<PathBuf>) -> Self {
        Self {
            engine: engine.into(),
            model: None,
            device: None,
            language: None,
            audio_path: audio_path.into(),
            options: Map::new(),
        }
    }
}

/// Sequences load-then-transcribe on the chosen adapter and assembles the
/// response. Native work runs on the blocking pool.
pub struct TranscriptionService {
    registry: Arc<EngineRegistry>,
    probe: Arc<dyn AccelerationProbe>,
    defaults: EngineDefaults,
}

impl TranscriptionService {
    pub fn new(
        registry: Arc<EngineRegistry>,
        probe: Arc<dyn AccelerationProbe>,
        defaults: EngineDefaults,
    ) -> Self {
        Self {
            registry,
            probe,
            defaults,
        }
    }

    pub async fn run(&self, request: TranscribeRequest) -> Result<TranscribeResponse, EngineError> {
        let adapter = self.registry.get(&request.engine)?;
        let engine = adapter.name();

        let requested_device = request.device.as_deref().unwrap_or(&self.defaults.device);
        let device = resolve_device(requested_device, self.probe.as_ref());

        let model = match request.model {
            Some(model) => model,
            None => self.default_model(engine, device)?,
        };

        let options = TranscriptionOptions {
            language: request.language,
            extra: request.options,
        };
        let language = options.language.clone();
        let audio_path = request.audio_path;
        let model_id = model.clone();

        let (result, elapsed) = tokio::task::spawn_blocking(move || {
            let resident = adapter.load(&model_id, device)?;

            let started = Instant::now();
            let result = adapter.transcribe_with(&resident, &audio_path, &options)?;
            Ok::<_, EngineError>((result, started.elapsed()))
        })
        .await
        .map_err(|e| EngineError::Transcription(format!("task join error: {e}")))??;

        let duration_seconds = elapsed.as_secs_f64();

        tracing::info!(
            duration_seconds,
            engine = %engine,
            model = %model,
            device = %device,
            language = language.as_deref().unwrap_or("auto"),
            "Transcription completed"
        );

        Ok(TranscribeResponse::assemble(
            engine,
            model,
            device,
            result,
            duration_seconds,
        ))
    }

    /// Rejects unknown engine names before any upload work starts.
    pub fn validate_engine(&self, name: &str) -> Result<EngineName, EngineError> {
        Ok(self.registry.get(name)?.name())
    }

    /// Engines this service can drive and the model each defaults to.
    pub fn catalog(&self) -> EngineCatalog {
        let available = self.registry.names();
        let defaults = available
            .iter()
            .filter_map(|engine| {
                self.defaults
                    .models
                    .get(engine)
                    .map(|model| (*engine, model.clone()))
            })
            .collect();

        EngineCatalog {
            available,
            defaults,
        }
    }

    fn default_model(
        &self,
        engine: EngineName,
        device: ComputeDevice,
    ) -> Result<String, EngineError> {
        self.defaults
            .models
            .get(&engine)
            .cloned()
            .ok_or_else(|| EngineError::Load {
                model_id: String::new(),
                device,
                source: NativeError::ModelNotFound(format!(
                    "no default model configured for engine {}",
                    engine
                )),
            })
    }
}
