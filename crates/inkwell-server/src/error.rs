use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use inkwell_gate::AccessError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("access error: {0}")]
    Access(#[from] AccessError),

    #[error("session error: {0}")]
    Session(#[from] inkwell_session::SessionError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// `{"message": "..."}`, the body of every error response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// An [`AccessError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AccessError);

/// Result alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        Self(err)
    }
}

pub fn status_for(err: &AccessError) -> StatusCode {
    match err {
        AccessError::Unauthorized => StatusCode::UNAUTHORIZED,
        AccessError::Forbidden(_) => StatusCode::FORBIDDEN,
        AccessError::NotFound(_) => StatusCode::NOT_FOUND,
        AccessError::Validation(_) => StatusCode::BAD_REQUEST,
        AccessError::Conflict(_) => StatusCode::CONFLICT,
        AccessError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        tracing::debug!(kind = self.0.kind(), status = status.as_u16(), "request rejected");
        let message = match &self.0 {
            AccessError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error while handling request");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(MessageBody { message })).into_response()
    }
}
