//! Error handling - the single place where failures become HTTP responses.

use actix_web::error::{JsonPayloadError, PathError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use chapel_core::error::DomainError;
use chapel_core::ports::{AuthError, SessionStoreError, StorageError};
use chapel_shared::ErrorResponse;
use std::fmt;

/// Application-level error type that converts to `{"error": ...}` responses.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized,
    InvalidCredentials,
    NotFound(&'static str),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::NotFound(what) => write!(f, "{} not found", what),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::BadRequest(detail) => ErrorResponse::new(detail.clone()),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::InvalidCredentials => ErrorResponse::invalid_credentials(),
            AppError::NotFound(what) => ErrorResponse::not_found(what),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, .. } => AppError::NotFound(entity_type),
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::Unauthorized => AppError::Unauthorized,
            AuthError::HashingError(msg) => AppError::Internal(format!("credential check: {msg}")),
            AuthError::Store(e) => AppError::from(e),
        }
    }
}

impl From<SessionStoreError> for AppError {
    fn from(err: SessionStoreError) -> Self {
        AppError::Internal(format!("session store: {err}"))
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Internal(format!("file store: {err}"))
    }
}

/// `JsonConfig` error handler: malformed bodies get the JSON error envelope.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "Request body too large".to_string()
        }
        other => format!("Invalid JSON body: {other}"),
    };
    AppError::BadRequest(message).into()
}

/// `PathConfig` error handler: a non-numeric id names no post.
pub fn path_error_handler(_err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::NotFound("Post").into()
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
