//! Error types for the agenda server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable error codes sent to the console alongside the HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    BadValue = 2,
    StaleReference = 3,
    NoSuchData = 4,
    RemoteFailure = 5,
    DbFailure = 6,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Required field missing or logically inconsistent input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced client/barber/service/package is no longer active
    #[error("Stale reference: {0}")]
    StaleReference(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The persistence collaborator rejected the call
    #[error("Remote failure: {0}")]
    Remote(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation and stale-reference failures are detected before any
    /// remote call and are never retried.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_) | AppError::StaleReference(_))
    }

    /// Message shown to the person who triggered the operation
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::StaleReference(msg) | AppError::NotFound(msg) => {
                msg.clone()
            }
            AppError::Remote(_) | AppError::Database(_) | AppError::Internal(_) => {
                "The operation could not be completed. Please try again.".to_string()
            }
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::StaleReference(_) => ErrorCode::StaleReference,
            AppError::NotFound(_) => ErrorCode::NoSuchData,
            AppError::Remote(_) => ErrorCode::RemoteFailure,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                errs.first().map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field));
                    (field.to_string(), message)
                })
            })
            .collect();
        // HashMap iteration order is not stable
        fields.sort();

        match fields.into_iter().next() {
            Some((_, message)) => AppError::Validation(message),
            None => AppError::Validation(errors.to_string()),
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) | AppError::StaleReference(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Remote(msg) => {
                tracing::error!("Remote failure: {}", msg);
                StatusCode::BAD_GATEWAY
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let code = self.code();
        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message: self.user_message(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
