use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::presentation::state::AppState;

pub async fn engines_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.transcription_service.catalog()))
}
