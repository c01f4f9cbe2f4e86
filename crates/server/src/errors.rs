use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::auth::errors::AuthError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

/// Everything a handler can fail with, rendered as `{"error": message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Full authentication is required to access this resource")]
    Unauthorized,
    #[error("Access is denied")]
    Forbidden,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Service(ServiceError::IllegalModification(_)) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Service(ServiceError::RemoteUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Auth(e) => StatusCode::from_u16(e.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = self.to_string();
        if status.is_server_error() {
            error!(%status, error = %msg, "request failed");
        } else {
            warn!(%status, error = %msg, "request rejected");
        }
        (status, Json(ErrorBody::new(msg))).into_response()
    }
}

/// `Option` → NotFound with the given message.
pub trait OrNotFound<T> {
    fn or_not_found(self, msg: impl FnOnce() -> String) -> Result<T, ApiError>;
}

impl<T> OrNotFound<T> for Option<T> {
    fn or_not_found(self, msg: impl FnOnce() -> String) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::Service(ServiceError::not_found(msg())))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database setup failed: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_status_codes() {
        assert_eq!(ApiError::from(ServiceError::illegal("x")).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(ServiceError::not_found("x")).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(ServiceError::unavailable("x")).status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ApiError::from(AuthError::Blocked).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::from(AuthError::Unauthorized).status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn message_is_carried_verbatim() {
        let e = ApiError::from(ServiceError::not_found("No community with ID 7"));
        assert_eq!(e.to_string(), "No community with ID 7");
    }
}
