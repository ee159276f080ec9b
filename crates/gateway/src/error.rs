//! Transport error envelope.
//!
//! Every failure leaves the gateway as `{ "error": "<message>" }` with an
//! HTTP status. Messages are fixed strings; the underlying cause is logged
//! server-side and never echoed to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use yf_domain::error::Error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthenticated,
    #[error("Forbidden")]
    Forbidden,
    #[error("Storage unavailable")]
    StoreUnavailable,
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::StoreUnavailable | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Build a standardized JSON error response: `{ "error": "<message>" }`.
pub fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        api_error(self.status(), self.to_string())
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::Validation(msg) => ApiError::BadRequest(msg),
            Error::Auth(reason) => {
                tracing::debug!(reason = %reason, "request not authenticated");
                ApiError::Unauthenticated
            }
            Error::Store(_) | Error::Http(_) | Error::Timeout(_) => {
                tracing::error!(error = %e, "message store unavailable");
                ApiError::StoreUnavailable
            }
            other => {
                tracing::error!(error = %other, "unexpected internal error");
                ApiError::Internal
            }
        }
    }
}
