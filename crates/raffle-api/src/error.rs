//! Secret friend raffle API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use raffle_core::error::RaffleError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `RaffleError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub RaffleError);

impl From<RaffleError> for ApiError {
    fn from(err: RaffleError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            RaffleError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            RaffleError::IndexOutOfRange { .. } => (StatusCode::NOT_FOUND, "index_out_of_range"),
            RaffleError::SessionLocked => (StatusCode::CONFLICT, "session_locked"),
            RaffleError::DrawInProgress => (StatusCode::CONFLICT, "draw_in_progress"),
            RaffleError::NothingDrawn => (StatusCode::CONFLICT, "nothing_drawn"),
            RaffleError::EngineStopped => (StatusCode::SERVICE_UNAVAILABLE, "engine_stopped"),
            RaffleError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
