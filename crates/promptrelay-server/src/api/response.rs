use axum::{Json, http::StatusCode};
use serde::Serialize;

/// JSON error body for rejected requests, `{"error": "..."}`.
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    pub fn with_status(
        status: StatusCode,
        message: impl Into<String>,
    ) -> (StatusCode, Json<Self>) {
        (status, Json(Self::new(message)))
    }
}
