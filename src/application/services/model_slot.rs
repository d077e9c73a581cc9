use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use crate::application::ports::{EngineError, ModelLoader, ResidentModel};
use crate::domain::{ComputeDevice, EngineName, LoadKey};

/// Lazily loaded, replaceable model storage shared by every adapter.
///
/// `load` is double-checked: the fast path only reads the resident record,
/// real (re)loads are serialized by `load_lock`. Both `load` and `snapshot`
/// hand out an `Arc`, so an in-flight transcription keeps its model alive
/// even if a concurrent load replaces it.
pub struct ModelSlot {
    engine: EngineName,
    loader: Arc<dyn ModelLoader>,
    resident: RwLock<Option<Arc<ResidentModel>>>,
    load_lock: Mutex<()>,
}

impl ModelSlot {
    pub fn new(engine: EngineName, loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            engine,
            loader,
            resident: RwLock::new(None),
            load_lock: Mutex::new(()),
        }
    }

    /// Returns the record holding exactly `(model_id, device)`, constructing
    /// it first when something else is resident.
    pub fn load(
        &self,
        model_id: &str,
        device: ComputeDevice,
    ) -> Result<Arc<ResidentModel>, EngineError> {
        let key = LoadKey::new(model_id, device);
        if let Some(resident) = self.resident_for(&key) {
            return Ok(resident);
        }

        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(resident) = self.resident_for(&key) {
            tracing::debug!(engine = %self.engine, key = %key, "Model loaded by a concurrent request");
            return Ok(resident);
        }

        tracing::info!(engine = %self.engine, model = model_id, device = %device, "Loading model");
        let started = Instant::now();

        let load_error = |source| EngineError::Load {
            model_id: model_id.to_string(),
            device,
            source,
        };

        let mut model = self.loader.load(model_id).map_err(load_error)?;
        let placement = model.place_on(device).map_err(load_error)?;

        let resident = Arc::new(ResidentModel::new(key, placement, model));

        let previous = self
            .resident
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(resident.clone());

        tracing::info!(
            engine = %self.engine,
            model = model_id,
            device = %device,
            interface = %resident.interface,
            placement = placement.as_str(),
            evicted = ?previous.as_ref().map(|p| p.key.to_string()),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model resident"
        );

        Ok(resident)
    }

    pub fn snapshot(&self) -> Result<Arc<ResidentModel>, EngineError> {
        self.resident
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(EngineError::NotLoaded {
                engine: self.engine,
            })
    }

    pub fn loaded_key(&self) -> Option<LoadKey> {
        self.resident
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|r| r.key.clone())
    }

    fn resident_for(&self, key: &LoadKey) -> Option<Arc<ResidentModel>> {
        self.resident
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|r| &r.key == key)
            .cloned()
    }
}
