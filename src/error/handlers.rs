//! Error handlers
//!
//! Converts store errors into HTTP responses at the handler boundary.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};

use crate::error::types::StorageError;
use crate::protocol::responses::ErrorResponse;

/// Log a store error with full detail
pub fn handle_error(err: &StorageError) {
    match err {
        StorageError::Io { .. } => error!("Store error: {}", err),
        _ => warn!("Request rejected: {}", err),
    }
}

/// Convert error to HTTP status code
pub fn error_to_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::Validation(_) => StatusCode::BAD_REQUEST,
        StorageError::Conflict(_) => StatusCode::BAD_REQUEST,
        StorageError::Forbidden(_) => StatusCode::FORBIDDEN,
        StorageError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for StorageError {
    fn into_response(self) -> Response {
        handle_error(&self);
        let body = ErrorResponse {
            error: self.client_message(),
        };
        (error_to_status(&self), Json(body)).into_response()
    }
}
