use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use aura_core::error::CoreError;

use crate::protocol::Status;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the `Status {code, message}` JSON
/// body with every 4xx/5xx. Internal detail is logged server-side and never
/// surfaced to clients.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `aura-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, .. } => {
                    (StatusCode::NOT_FOUND, format!("unknown {entity}"))
                }
                CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
            AppError::Database(err) => match err {
                sqlx::Error::RowNotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
                other => {
                    tracing::error!(error = %other, "Database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        status_response(status, &message)
    }
}

/// Build a `Status`-shaped JSON response for the given code.
///
/// `axum::Json` sets `Content-Type: application/json` before the body is
/// written, so the header always reaches the client.
pub fn status_response(status: StatusCode, message: &str) -> Response {
    let body = Status {
        code: status.as_u16(),
        message: message.to_string(),
    };
    (status, axum::Json(body)).into_response()
}
