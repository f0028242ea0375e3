//! HTTP error responses for the web adapter.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::error::AxiomError;

/// An error rendered as `{"detail": message}` with the given status.
#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

pub fn status_from_error(err: &AxiomError) -> StatusCode {
    match err {
        AxiomError::InvalidArgument { .. }
        | AxiomError::ConfigMissing { .. }
        | AxiomError::ConfigInvalid { .. }
        | AxiomError::ConfigParse { .. } => StatusCode::BAD_REQUEST,
        AxiomError::NoData { .. } | AxiomError::RunNotFound { .. } => StatusCode::NOT_FOUND,
        AxiomError::MarketData { .. } => StatusCode::BAD_GATEWAY,
        AxiomError::Database { .. } | AxiomError::DatabaseQuery { .. } | AxiomError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<AxiomError> for WebError {
    fn from(err: AxiomError) -> Self {
        let status = status_from_error(&err);
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }
        Self::new(status, err.to_string())
    }
}

impl From<tokio::task::JoinError> for WebError {
    fn from(err: tokio::task::JoinError) -> Self {
        tracing::error!(error = %err, "blocking store task failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.message }))).into_response()
    }
}
