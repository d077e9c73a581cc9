use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::{EngineError, UploadStoreError};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Every failure the HTTP surface can report, rendered as
/// `{"error": "<Kind>: <detail>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Upload(#[from] UploadStoreError),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Engine(e) => e.kind(),
            ApiError::Validation(_) => "ValidationError",
            ApiError::Upload(_) => "UploadError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "Request failed");
        } else {
            tracing::warn!(kind = self.kind(), error = %self, "Request rejected");
        }

        let body = ErrorResponse {
            error: format!("{}: {}", self.kind(), self),
        };
        (status, Json(body)).into_response()
    }
}
