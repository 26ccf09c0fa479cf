use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    Validation(String),
    #[error("trip not found")]
    NotFound,
    #[error("geocoding request failed")]
    Upstream(#[source] anyhow::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }
}

// Validation messages describe the client's own input and are echoed back.
// Everything else is logged here and answered with a fixed message, so
// internal details never reach the client on any path.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Trip not found".to_string()),
            AppError::Upstream(cause) => {
                error!("geocoding request failed: {cause:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to search location".to_string(),
                )
            }
            AppError::Config(_) | AppError::Io(_) | AppError::Database(_) | AppError::Other(_) => {
                error!("request failed: {self:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
