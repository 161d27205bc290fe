//! Error types for Flightdesk
//!
//! This module defines custom error types used throughout the application.
//! Error bodies are plain text: the panel's browser script shows them as-is.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::records::StoreError;

/// Fixed body for requests without an active session
pub const UNAUTHORIZED_MESSAGE: &str = "No autorizado. Por favor, inicie sesión.";

/// Fixed body for a rejected login
pub const INVALID_CREDENTIALS_MESSAGE: &str =
    "Usuario o contraseña incorrectos. Por favor, intente de nuevo.";

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{}", UNAUTHORIZED_MESSAGE)]
    Unauthorized,

    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A step before the insight stream opened failed. `action` names what
    /// was being generated, e.g. "el resumen de vuelos".
    #[error("Error al generar {action}: {message}")]
    InsightFailed {
        action: &'static str,
        message: String,
    },

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("Session store error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InsightFailed { .. }
            | AppError::Store(_)
            | AppError::RedisError(_)
            | AppError::JsonError(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self, "Request failed");
        }

        // Internal detail is surfaced verbatim; this is an internal admin tool.
        (status, self.to_string()).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
