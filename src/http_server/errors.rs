//! # API Errors
//!
//! Error type returned by the student handlers and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Body sent for every 5xx; details stay in the logs
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Request body was empty
    #[error("empty body")]
    EmptyBody,

    /// Request body is not a valid student document
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Required fields missing or zero-valued
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    /// Path id is not an integer
    #[error("invalid id: {0}")]
    InvalidId(String),

    // ==================
    // Storage Errors (404 / 5xx)
    // ==================
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::EmptyBody => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidId(_) => StatusCode::BAD_REQUEST,

            ApiError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let status = err.status_code();
        let error = if status.is_server_error() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            err.to_string()
        };

        Self {
            error,
            code: status.as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
