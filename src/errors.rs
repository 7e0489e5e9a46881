use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Service-level error type used throughout the application
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    /// Maps the error to an HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::DatabaseError(_) | ServiceError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::ValidationError(_)
            | ServiceError::InvalidInput(_)
            | ServiceError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to return to API clients. Database internals are not
    /// leaked; everything else echoes the error display.
    pub fn response_message(&self) -> String {
        match self {
            ServiceError::DatabaseError(_) => "A database error occurred".to_string(),
            ServiceError::InternalError(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(errors.to_string())
    }
}

/// JSON body returned for every error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub timestamp: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        let body = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: self.response_message(),
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

/// Errors raised at the HTTP boundary, before a service is reached
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Service(err) => err.into_response(),
            ApiError::ValidationError(msg) => {
                ServiceError::ValidationError(msg).into_response()
            }
            ApiError::NotFound(what) => ServiceError::NotFound(what).into_response(),
            ApiError::BadRequest(msg) => ServiceError::InvalidInput(msg).into_response(),
        }
    }
}

pub type AppError = ServiceError;
