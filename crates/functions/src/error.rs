//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, FunctionError>`. Over HTTP an error becomes a
//! status code plus a structured body:
//!
//! ```json
//! {"error": {"code": "unauthenticated", "message": "..."}}
//! ```
//!
//! Server-side failures are captured to Sentry before responding. For trigger
//! deliveries a 5xx status tells the host the event may be redelivered.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use wardrobe_core::PathError;
use wardrobe_core::callable::RequestError;

use crate::store::StoreError;

/// Error type for callable and trigger handlers.
#[derive(Debug, Error)]
pub enum FunctionError {
    /// No authenticated principal on a callable that requires one.
    #[error("The function must be called while authenticated.")]
    Unauthenticated,

    /// The payload cannot be used.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl FunctionError {
    /// Wire error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidArgument(_) => "invalid-argument",
            Self::Store(StoreError::NotFound(_)) => "not-found",
            Self::Store(StoreError::Unavailable(_)) => "unavailable",
            Self::Store(_) => "internal",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RequestError> for FunctionError {
    fn from(err: RequestError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

impl From<PathError> for FunctionError {
    fn from(err: PathError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for FunctionError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Function error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(StoreError::NotFound(_))
            | Self::Unauthenticated
            | Self::InvalidArgument(_) => self.to_string(),
            Self::Store(StoreError::Unavailable(_)) => "Store unavailable".to_string(),
            Self::Store(_) => "Internal error".to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `FunctionError`.
pub type Result<T> = std::result::Result<T, FunctionError>;

/// Set the Sentry user context for the current invocation.
pub fn set_sentry_user(uid: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(uid.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_error_display() {
        let err = FunctionError::InvalidArgument("limit must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid argument: limit must be positive");

        assert_eq!(
            FunctionError::Unauthenticated.to_string(),
            "The function must be called while authenticated."
        );
    }

    #[test]
    fn test_function_error_codes_and_status() {
        let cases = [
            (
                FunctionError::Unauthenticated,
                "unauthenticated",
                StatusCode::UNAUTHORIZED,
            ),
            (
                FunctionError::InvalidArgument("x".to_string()),
                "invalid-argument",
                StatusCode::BAD_REQUEST,
            ),
            (
                FunctionError::Store(StoreError::NotFound("users/u/items/x".to_string())),
                "not-found",
                StatusCode::NOT_FOUND,
            ),
            (
                FunctionError::Store(StoreError::Unavailable("down".to_string())),
                "unavailable",
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                FunctionError::Store(StoreError::DataCorruption("bad".to_string())),
                "internal",
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, code, status) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(err.status(), status);
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_lost_database_is_retryable() {
        let err = FunctionError::Store(StoreError::from(sqlx::Error::PoolTimedOut));
        assert_eq!(err.code(), "unavailable");
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = FunctionError::Store(StoreError::from(sqlx::Error::RowNotFound));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_request_error_maps_to_invalid_argument() {
        let err: FunctionError = RequestError::InvalidLimit(-3).into();
        assert_eq!(err.code(), "invalid-argument");
    }
}
