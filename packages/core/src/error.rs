use std::error::Error;
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::holidays::HolidayError;
use crate::repository::RepositoryError;

/// Unified application error.
///
/// Wraps the holiday pipeline and repository errors and adds the
/// startup and request validation failures, so every layer fails in a
/// predictable way at the HTTP boundary.
#[derive(Debug)]
pub enum AppError {
    Config(String),
    Validation(String),
    Holiday(HolidayError),
    Repository(RepositoryError),
    Unknown(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::Holiday(err) => write!(f, "Holiday error: {}", err),
            AppError::Repository(err) => write!(f, "Repository error: {}", err),
            AppError::Unknown(msg) => write!(f, "Unknown error: {}", msg),
        }
    }
}

impl Error for AppError {}

impl From<HolidayError> for AppError {
    fn from(err: HolidayError) -> Self {
        AppError::Holiday(err)
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl AppError {
    /// Status code and client-facing message. Internal detail stays out of
    /// the message for anything that maps to 5xx.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Holiday(err @ HolidayError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            AppError::Holiday(err) if err.is_unavailable() => (
                StatusCode::SERVICE_UNAVAILABLE,
                "holiday service unavailable".to_string(),
            ),
            AppError::Repository(err @ RepositoryError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            AppError::Repository(err @ RepositoryError::AlreadyExists(_)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
