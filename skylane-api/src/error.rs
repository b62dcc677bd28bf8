use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use skylane_core::DomainError;

#[derive(Debug)]
pub enum AppError {
    Unauthorized(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    Transient(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Transient(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound => {
                Self::NotFound("Not found, or you do not have permission.".to_string())
            }
            DomainError::SoldOut => Self::Conflict("This flight is sold out.".to_string()),
            DomainError::AlreadyCancelled => {
                Self::Conflict("This booking is already cancelled.".to_string())
            }
            DomainError::DuplicateFlightNumber(_) => Self::Conflict(err.to_string()),
            DomainError::EmailTaken(_) => Self::Conflict("Email already exists".to_string()),
            DomainError::Validation(msg) => Self::Validation(msg),
            DomainError::Transient(msg) => Self::Transient(msg),
            DomainError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
