//! Error taxonomy for the orchestration layer.
//!
//! Every failure that can surface to an HTTP caller is one of these
//! variants; handlers return `Result<_, ServiceError>` and the
//! `IntoResponse` impl shapes the JSON error body at the boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::warn;

use crate::http_types::ErrorResponse;

/// Failures produced while orchestrating a changelog request
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing or invalid caller input; no side effects performed yet
    #[error("{0}")]
    BadRequest(String),

    /// Authentication token missing or mismatched
    #[error("Invalid or missing API token")]
    Unauthorized,

    /// Local repository path does not exist on the host
    #[error("{0}")]
    NotFound(String),

    /// Remote fetch failed or timed out; stderr is already scrubbed of credentials
    #[error("Failed to clone repository: {stderr}")]
    Clone { stderr: String },

    /// External generator failed or timed out
    #[error("git-cliff failed: {stderr}")]
    Generation { stderr: String },

    /// Workspace creation or config write failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Clone { .. } | ServiceError::Generation { .. } | ServiceError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Wire-level error category, kept compatible with existing consumers
    pub fn category(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "Bad Request",
            ServiceError::Unauthorized => "Unauthorized",
            ServiceError::NotFound(_) => "Not Found",
            ServiceError::Clone { .. } | ServiceError::Generation { .. } | ServiceError::Io(_) => {
                "Internal Server Error"
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        let body = ErrorResponse::new(self.category(), self.to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServiceError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Clone {
                stderr: "x".into()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::Generation {
                stderr: "x".into()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_clone_error_message_shape() {
        let err = ServiceError::Clone {
            stderr: "fatal: could not read Username".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to clone repository: fatal: could not read Username"
        );
        assert_eq!(err.category(), "Internal Server Error");
    }

    #[test]
    fn test_io_error_maps_to_internal() {
        let err: ServiceError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.category(), "Internal Server Error");
    }
}
