use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy of the scoring path.
///
/// `Validation` is always client-attributable (400). `Configuration` covers a
/// missing or unreadable parameter file and `Internal` a broken contract inside
/// the core; both surface as 500.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PredictError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Internal(String),
}

pub type PredictResult<T> = Result<T, PredictError>;

impl PredictError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            Self::Validation(msg) => tracing::debug!("rejected request: {}", msg),
            Self::Configuration(msg) => tracing::warn!("configuration failure: {}", msg),
            Self::Internal(msg) => tracing::error!("internal failure: {}", msg),
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
