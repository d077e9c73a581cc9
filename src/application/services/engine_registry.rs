use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::ports::{EngineError, SpeechEngine};
use crate::domain::EngineName;

/// Read-only map from engine name to its adapter, built once at startup.
pub struct EngineRegistry {
    engines: BTreeMap<EngineName, Arc<dyn SpeechEngine>>,
}

impl EngineRegistry {
    pub fn new(engines: impl IntoIterator<Item = Arc<dyn SpeechEngine>>) -> Self {
        let engines = engines
            .into_iter()
            .map(|engine| {
                tracing::debug!(engine = %engine.name(), "Registering speech engine");
                (engine.name(), engine)
            })
            .collect();
        Self { engines }
    }

    /// Looks an adapter up by its (case-insensitive) name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn SpeechEngine>, EngineError> {
        name.parse::<EngineName>()
            .ok()
            .and_then(|engine| self.engines.get(&engine))
            .cloned()
            .ok_or_else(|| EngineError::UnknownEngine {
                name: name.trim().to_string(),
                valid: self.names(),
            })
    }

    pub fn names(&self) -> Vec<EngineName> {
        self.engines.keys().copied().collect()
    }
}
