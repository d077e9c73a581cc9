use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::compute_device::ComputeDevice;
use super::engine_name::EngineName;
use super::segment::Segments;

/// Per-call options. `extra` is an opaque bag handed to the native backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptionOptions {
    pub language: Option<String>,
    pub extra: Map<String, Value>,
}

impl TranscriptionOptions {
    pub fn with_language(language: Option<String>) -> Self {
        Self {
            language,
            extra: Map::new(),
        }
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

/// Adapter output after normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptionResult {
    pub text: String,
    pub language: Option<String>,
    pub segments: Option<Segments>,
    pub meta: Map<String, Value>,
}

/// What the service hands back to the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscribeResponse {
    pub engine: EngineName,
    pub model: String,
    pub device: ComputeDevice,
    pub language: Option<String>,
    pub text: String,
    pub segments: Option<Segments>,
    pub duration_seconds: f64,
    pub meta: Map<String, Value>,
}

impl TranscribeResponse {
    pub fn assemble(
        engine: EngineName,
        model: String,
        device: ComputeDevice,
        result: TranscriptionResult,
        duration_seconds: f64,
    ) -> Self {
        Self {
            engine,
            model,
            device,
            language: result.language,
            text: result.text,
            segments: result.segments,
            duration_seconds,
            meta: result.meta,
        }
    }
}

/// Known engines and the model each one falls back to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineCatalog {
    pub available: Vec<EngineName>,
    pub defaults: BTreeMap<EngineName, String>,
}
