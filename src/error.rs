//! Error types for the HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ocr::OcrError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned to HTTP clients
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unsupported content_type: {0}")]
    UnsupportedContentType(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Processing(#[from] OcrError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedContentType(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Self::Processing(e) => tracing::error!("OCR request failed: {}", e),
            _ => tracing::debug!("Rejected request: {}", self),
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
