//! Response building and error mapping.
//!
//! # Responsibilities
//! - Turn a synthesized [`Representation`] into an HTTP response
//! - Map handler failures onto status codes and bodies
//!
//! # Design Decisions
//! - Client errors that carry a message use the `{code, message}` JSON shape
//! - Unknown image formats answer 406 with an empty body
//! - Image failures answer 500 with a plain-text cause; compression
//!   failures answer 500 with a fixed JSON error

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::http::handlers::status::StatusCodeError;
use crate::synthesis::{Representation, SynthesisError};

/// JSON error body: `{"code": 404, "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for Representation {
    fn into_response(self) -> Response {
        let mut response = self.body.into_response();
        let headers = response.headers_mut();

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        if let Some(encoding) = self.content_encoding {
            headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static(encoding));
        }
        if let Some(value) = self
            .disposition
            .and_then(|d| HeaderValue::from_str(&d).ok())
        {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
        response
    }
}

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Status(#[from] StatusCodeError),

    /// A bundled document could not be read. Holds the display name.
    #[error("Failed to read {0} file")]
    Asset(&'static str),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::Synthesis(SynthesisError::NotAcceptable(token)) => {
                tracing::debug!(token = %token, "Rejected unknown image format");
                StatusCode::NOT_ACCEPTABLE.into_response()
            }
            HandlerError::Synthesis(err @ SynthesisError::Image { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
            HandlerError::Synthesis(SynthesisError::Compression { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to write JSON"})),
            )
                .into_response(),
            HandlerError::Status(err) => {
                ApiError::new(err.status(), err.to_string()).into_response()
            }
            err @ HandlerError::Asset(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
            HandlerError::Join(err) => {
                tracing::error!(error = %err, "Blocking task failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
