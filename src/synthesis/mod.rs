//! Representation synthesis: time-stamp images and compressed JSON.
//!
//! # Responsibilities
//! - Negotiate an image format from a path token or `Accept` header
//! - Render the time-stamp canvas in that format
//! - Compress an echoed payload with the requested codec
//!
//! # Design Decisions
//! - Synthesis is synchronous and CPU bound; handlers run it on the
//!   blocking pool
//! - Failures carry the format or codec that failed so the HTTP layer can
//!   pick the response shape without string matching

pub mod avif;
pub mod canvas;
pub mod compression;
pub mod format;
pub mod image;

use std::process::ExitStatus;

use axum::body::Bytes;
use thiserror::Error;

use crate::config::ImageConfig;
use crate::normalizer::CompressedEcho;

pub use self::avif::{AvifEncoder, CommandAvifEncoder};
pub use self::compression::{wrap_compressed, Codec};
pub use self::format::{negotiate, ImageFormat};
pub use self::image::ImageSynthesizer;

/// Low-level encoder failure.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Image(#[from] ::image::ImageError),
    #[error(transparent)]
    Png(#[from] png::EncodingError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Subprocess {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The path named a format that does not exist.
    #[error("no image format named {0:?}")]
    NotAcceptable(String),
    #[error("Failed to generate {format}: {source}")]
    Image {
        format: ImageFormat,
        #[source]
        source: EncodeError,
    },
    #[error("Failed to compress with {codec}: {source}")]
    Compression {
        codec: Codec,
        #[source]
        source: EncodeError,
    },
}

/// A finished response body and the headers describing it.
#[derive(Debug, Clone)]
pub struct Representation {
    pub body: Bytes,
    pub content_type: &'static str,
    pub content_encoding: Option<&'static str>,
    pub disposition: Option<String>,
}

impl Representation {
    pub fn image(format: ImageFormat, bytes: Vec<u8>) -> Self {
        Self {
            body: bytes.into(),
            content_type: format.content_type(),
            content_encoding: None,
            disposition: Some(format.disposition()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RepresentationRequest {
    Image {
        format_token: Option<String>,
        accept: Option<String>,
    },
    Compression {
        codec: Codec,
        payload: CompressedEcho,
    },
}

/// Entry point shared by the image and compression handlers.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    images: ImageSynthesizer,
}

impl Synthesizer {
    pub fn new(images: ImageSynthesizer) -> Self {
        Self { images }
    }

    pub fn from_config(config: &ImageConfig) -> Self {
        Self::new(ImageSynthesizer::from_config(config))
    }

    pub fn synthesize(
        &self,
        request: RepresentationRequest,
    ) -> Result<Representation, SynthesisError> {
        match request {
            RepresentationRequest::Image {
                format_token,
                accept,
            } => self
                .images
                .generate(format_token.as_deref(), accept.as_deref()),
            RepresentationRequest::Compression { codec, payload } => {
                wrap_compressed(codec, &payload)
            }
        }
    }
}
