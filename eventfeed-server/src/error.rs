//! Error handling for the eventfeed server

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use eventfeed::EventFeedError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Server error types
#[derive(Debug, Error)]
pub enum ServerError {
    /// Recommendation engine error
    #[error("{0}")]
    Engine(#[from] EventFeedError),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found error
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request error
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Engine(err) => match err {
                EventFeedError::EventNotFound(_)
                | EventFeedError::UserNotFound(_)
                | EventFeedError::NotFound(_) => StatusCode::NOT_FOUND,
                EventFeedError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                EventFeedError::Conflict(_) => StatusCode::CONFLICT,
                EventFeedError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ServerError::Validation(_) => "validation_error",
            ServerError::NotFound(_) => "not_found",
            ServerError::BadRequest(_) => "bad_request",
            ServerError::Internal(_) => "internal_error",
            ServerError::Engine(err) => match err {
                EventFeedError::EventNotFound(_)
                | EventFeedError::UserNotFound(_)
                | EventFeedError::NotFound(_) => "not_found",
                EventFeedError::InvalidInput(_) => "invalid_input",
                EventFeedError::Conflict(_) => "conflict",
                EventFeedError::Timeout(_) => "timeout",
                _ => "engine_error",
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let error_response = ErrorResponse {
            error: self.error_type().to_string(),
            message: self.to_string(),
            details: None,
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

/// Helper function to create a validation error
pub fn validation_error(message: &str) -> ServerError {
    ServerError::Validation(message.to_string())
}

/// Helper function to create a bad request error
pub fn bad_request(message: &str) -> ServerError {
    ServerError::BadRequest(message.to_string())
}
