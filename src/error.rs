use crate::lifecycle::LifecycleError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SailError>;

#[derive(Debug, Error)]
pub enum SailError {
    #[error("Provider not found: {name}")]
    ProviderNotFound { name: String },

    #[error("Provider '{name}' is not of type {expected}")]
    ProviderTypeMismatch { name: String, expected: String },

    #[error("Container is frozen, cannot register provider '{name}'")]
    ContainerFrozen { name: String },

    #[error("Route already registered: {pattern}")]
    DuplicateRoute { pattern: String },

    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidRoute { pattern: String, reason: String },

    #[error("Invalid configuration for {key}: {message}")]
    Config { key: String, message: String },

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("HTTP listener failed: {0}")]
    Listener(#[from] std::io::Error),
}

impl SailError {
    fn status(&self) -> StatusCode {
        match self {
            SailError::ProviderNotFound { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SailError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(status = status.as_u16(), "Request failed: {}", self);

        (
            status,
            Json(json!({
                "statusCode": status.as_u16(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
        )
            .into_response()
    }
}
