//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Auth errors
    InvalidApiKey,

    // Configuration errors
    ProtectKeyNotConfigured,

    // Validation errors
    ValidationError(String),

    // Server errors
    InternalError(String),
}

impl AppError {
    /// Shorthand for a missing required field
    pub fn missing(field: &str) -> Self {
        AppError::ValidationError(format!("{} required", field))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidApiKey => (StatusCode::FORBIDDEN, "invalid API key"),
            AppError::ProtectKeyNotConfigured => {
                tracing::warn!("PROTECT_API_KEY not configured; rejecting control request");
                (StatusCode::SERVICE_UNAVAILABLE, "server misconfigured")
            }
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
