//! Status code echo: `/status` and `/status/{code}`.
//!
//! The code is set verbatim; the body is empty. Bare `/status` answers 200.

use std::num::ParseIntError;

use axum::extract::Path;
use axum::http::StatusCode;
use thiserror::Error;

use crate::http::response::HandlerError;

#[derive(Debug, Error)]
pub enum StatusCodeError {
    #[error("invalid status code {input:?}: {source}")]
    Parse {
        input: String,
        #[source]
        source: ParseIntError,
    },

    /// Parsed, but not a three-digit code the HTTP stack can send.
    #[error("status code {0} cannot be sent")]
    Unrepresentable(i64),
}

impl StatusCodeError {
    pub fn status(&self) -> StatusCode {
        match self {
            StatusCodeError::Parse { .. } => StatusCode::NOT_FOUND,
            StatusCodeError::Unrepresentable(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Parse a base-10 status code from a path segment.
pub fn parse_status(input: &str) -> Result<StatusCode, StatusCodeError> {
    let code: i64 = input.parse().map_err(|source| StatusCodeError::Parse {
        input: input.to_string(),
        source,
    })?;

    u16::try_from(code)
        .ok()
        .and_then(|c| StatusCode::from_u16(c).ok())
        .ok_or(StatusCodeError::Unrepresentable(code))
}

pub async fn default_status() -> StatusCode {
    StatusCode::OK
}

pub async fn reflect_status(Path(code): Path<String>) -> Result<StatusCode, HandlerError> {
    Ok(parse_status(&code)?)
}
