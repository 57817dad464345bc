use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::{StorageFailure, StoreError};
use thiserror::Error;
use tracing::{error, warn};

/// JSON error body returned by every API route.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub code: u16,
    pub message: String,
}

impl From<StoreError> for JsonApiError {
    fn from(e: StoreError) -> Self {
        let (status, title) = match &e {
            StoreError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "Not Found"),
            StoreError::Storage(s) if s.kind == StorageFailure::Timeout => (StatusCode::GATEWAY_TIMEOUT, "Storage Timeout"),
            StoreError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Storage Error"),
        };
        Self { status, error: title, code: e.code(), message: e.to_string() }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), code = self.code, error = %self.message, "request failed");
        } else {
            warn!(status = self.status.as_u16(), code = self.code, error = %self.message, "request rejected");
        }
        let body = serde_json::json!({"error": self.error, "code": self.code, "message": self.message});
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
