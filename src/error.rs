//! Error handling module
//!
//! Centralized error types and HTTP response conversion. Validation
//! failures carry a field-keyed message map; everything else responds
//! with a `{"detail": ...}` body. Internal details are logged, never
//! surfaced.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Field-keyed validation messages, serialized as
/// `{"field": ["message", ...]}`.
#[derive(Debug, Default, Serialize)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message under a field key.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Err(AppError::Validation) if any message was recorded.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Validation failed")]
    Validation(ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("Not found")]
    NotFound,

    // Server errors (5xx)
    #[error("Reset failed")]
    ResetFailed(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation error with a single message under one field.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        AppError::Validation(errors)
    }
}

/// Generic error response body
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

impl DetailResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // 400 Bad Request, field-keyed body
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }

            // 401 Unauthorized
            AppError::Unauthorized(detail) => (
                StatusCode::UNAUTHORIZED,
                Json(DetailResponse::new(detail)),
            )
                .into_response(),

            // 404 Not Found; cross-owner and nonexistent look identical
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(DetailResponse::new("Not found.")),
            )
                .into_response(),

            // 500 Internal Server Error
            AppError::ResetFailed(e) => {
                tracing::error!("Reset failed: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(DetailResponse::new(
                        "An error occurred while resetting data.",
                    )),
                )
                    .into_response()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(DetailResponse::new("Internal server error.")),
                )
                    .into_response()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(DetailResponse::new("Internal server error.")),
                )
                    .into_response()
            }
        }
    }
}
