use http::StatusCode;
use thiserror::Error;

use crate::extract::ExtractError;
use crate::index::IndexError;
use crate::vector::VectorError;

#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("No text could be extracted from {0}")]
    EmptyDocument(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Text extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Vector index error: {0}")]
    Index(#[from] IndexError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] VectorError),
}

pub type Result<T> = std::result::Result<T, MatcherError>;

impl MatcherError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MatcherError::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
            MatcherError::EmptyDocument(_) => StatusCode::BAD_REQUEST,
            MatcherError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            MatcherError::Extraction(ExtractError::Parse(_)) => StatusCode::BAD_REQUEST,
            MatcherError::Extraction(ExtractError::Unsupported(_)) => {
                StatusCode::NOT_IMPLEMENTED
            }
            MatcherError::Index(e) => match e {
                IndexError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                IndexError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                IndexError::Transport { .. }
                | IndexError::Status { .. }
                | IndexError::Decode(_) => StatusCode::BAD_GATEWAY,
                IndexError::DimensionMismatch { .. }
                | IndexError::InvalidConfig(_)
                | IndexError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            MatcherError::Embedding(VectorError::EmbeddingError(_)) => StatusCode::BAD_GATEWAY,
            MatcherError::Embedding(VectorError::DimensionMismatch { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}


// Axum IntoResponse implementation (feature-gated)
#[cfg(feature = "axum-support")]
use axum::response::{IntoResponse, Json, Response};
#[cfg(feature = "axum-support")]
use serde::Serialize;

#[cfg(feature = "axum-support")]
#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[cfg(feature = "axum-support")]
impl IntoResponse for MatcherError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{self}");
        } else {
            tracing::debug!(status = status.as_u16(), "{self}");
        }
        let detail = match self {
            MatcherError::UnsupportedFormat(msg) | MatcherError::InvalidRequest(msg) => msg,
            MatcherError::EmptyDocument(_) => "Could not extract text from PDF.".to_string(),
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}
