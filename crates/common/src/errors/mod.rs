//! Error types for DocRelay services
//!
//! Provides:
//! - Distinct error types for input, upstream, and internal failures
//! - HTTP status code mapping
//! - A flat `{"error": message}` response body
//! - Error codes for logs and metrics labels

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for logs and metrics labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation errors
    MissingQuery,
    InvalidFormat,

    // External service errors
    SearchStoreError,
    SummarizerError,

    // Internal errors
    InternalError,
    SerializationError,
}

impl ErrorCode {
    /// Stable lowercase label for metrics
    pub fn as_label(&self) -> &'static str {
        match self {
            ErrorCode::MissingQuery => "missing_query",
            ErrorCode::InvalidFormat => "invalid_format",
            ErrorCode::SearchStoreError => "search_store",
            ErrorCode::SummarizerError => "summarizer",
            ErrorCode::InternalError => "internal",
            ErrorCode::SerializationError => "serialization",
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Query missing")]
    MissingQuery,

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    // External service errors
    #[error("Search store error: {message}")]
    SearchStore { message: String },

    #[error("Summarizer error: {message}")]
    Summarizer { message: String },

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::MissingQuery => ErrorCode::MissingQuery,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::SearchStore { .. } => ErrorCode::SearchStoreError,
            AppError::Summarizer { .. } => ErrorCode::SummarizerError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// Every upstream failure surfaces as a plain 500; callers are not told
    /// which collaborator failed beyond the message text.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::MissingQuery |
            AppError::InvalidFormat { .. } => StatusCode::BAD_REQUEST,

            // 500 Internal Server Error
            AppError::SearchStore { .. } |
            AppError::Summarizer { .. } |
            AppError::Internal { .. } |
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Error response body returned to API callers
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_query_mapping() {
        let err = AppError::MissingQuery;
        assert_eq!(err.code(), ErrorCode::MissingQuery);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Query missing");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_upstream_errors_are_500() {
        let search = AppError::SearchStore { message: "503 Service Unavailable".into() };
        let summarize = AppError::Summarizer { message: "missing choices".into() };

        assert_eq!(search.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(summarize.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(search.is_server_error());
        assert_eq!(search.code(), ErrorCode::SearchStoreError);
        assert_eq!(search.code().as_label(), "search_store");
        assert_eq!(summarize.code().as_label(), "summarizer");
    }

    #[test]
    fn test_response_body_shape() {
        let response = AppError::MissingQuery.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = tokio_test::block_on(axum::body::to_bytes(response.into_body(), usize::MAX))
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Query missing" }));
    }
}
