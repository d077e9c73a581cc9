use axum::Json;
use axum::extract::{Multipart, State};
use serde_json::{Map, Value};

use crate::application::services::TranscribeRequest;
use crate::domain::{EngineName, TranscribeResponse};
use crate::presentation::state::AppState;

use super::error::ApiError;

/// Parsed multipart form of a `/transcribe` call. Blank text fields count
/// as absent.
#[derive(Debug, Default)]
struct TranscribeForm {
    file: Option<(Option<String>, Vec<u8>)>,
    engine: Option<String>,
    model: Option<String>,
    device: Option<String>,
    language: Option<String>,
    options: Map<String, Value>,
}

impl TranscribeForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = TranscribeForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::Validation(format!("failed to read multipart: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == "file" {
                let filename = field.file_name().map(String::from);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("failed to read file: {}", e)))?;
                form.file = Some((filename, data.to_vec()));
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| ApiError::Validation(format!("failed to read field '{}': {}", name, e)))?;
            let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());

            match name.as_str() {
                "engine" => form.engine = value,
                "model" => form.model = value,
                "device" => form.device = value,
                "language" => form.language = value,
                "options" => form.options = parse_options(value.as_deref())?,
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }
}

fn parse_options(raw: Option<&str>) -> Result<Map<String, Value>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Map::new());
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::Validation(
            "options must be a JSON object".to_string(),
        )),
        Err(e) => Err(ApiError::Validation(format!("options is not valid JSON: {}", e))),
    }
}

#[tracing::instrument(skip(state, multipart))]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let form = TranscribeForm::read(multipart).await?;

    let engine = form
        .engine
        .unwrap_or_else(|| EngineName::Whisper.as_str().to_string());
    state.transcription_service.validate_engine(&engine)?;

    let (filename, data) = form
        .file
        .ok_or_else(|| ApiError::Validation("file is required".to_string()))?;

    tracing::debug!(
        filename = filename.as_deref().unwrap_or("unknown"),
        bytes = data.len(),
        "Audio upload received"
    );

    let audio_path = state.upload_store.save(&data, filename.as_deref()).await?;

    let request = TranscribeRequest {
        engine,
        model: form.model,
        device: form.device,
        language: form.language,
        audio_path: audio_path.clone(),
        options: form.options,
    };

    let outcome = state.transcription_service.run(request).await;

    if let Err(e) = state.upload_store.remove(&audio_path).await {
        tracing::warn!(path = %audio_path.display(), error = %e, "Failed to remove upload");
    }

    Ok(Json(outcome?))
}
