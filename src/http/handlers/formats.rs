//! Response formats: bundled sample documents and compressed echoes.

use std::path::Path;

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;

use crate::http::request::ClientIp;
use crate::http::response::HandlerError;
use crate::http::server::AppState;
use crate::normalizer::extract::extract_headers;
use crate::normalizer::CompressedEcho;
use crate::synthesis::{Codec, Representation, RepresentationRequest};

/// A document served verbatim from the templates directory.
#[derive(Debug, Clone, Copy)]
pub struct SampleDocument {
    pub file: &'static str,
    pub label: &'static str,
    pub content_type: &'static str,
}

pub const XML: SampleDocument = SampleDocument {
    file: "sample.xml",
    label: "XML",
    content_type: "application/xml",
};
pub const HTML: SampleDocument = SampleDocument {
    file: "sample.html",
    label: "HTML",
    content_type: "text/html",
};
pub const JSON: SampleDocument = SampleDocument {
    file: "sample.json",
    label: "JSON",
    content_type: "application/json",
};
pub const DENY: SampleDocument = SampleDocument {
    file: "deny.txt",
    label: "Deny",
    content_type: "text/plain",
};
pub const ROBOTS: SampleDocument = SampleDocument {
    file: "robots.txt",
    label: "Robots.txt",
    content_type: "text/plain",
};

async fn serve_document(
    templates_dir: &Path,
    document: SampleDocument,
) -> Result<impl IntoResponse, HandlerError> {
    let path = templates_dir.join(document.file);
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to read sample document");
        HandlerError::Asset(document.label)
    })?;
    Ok(([(header::CONTENT_TYPE, document.content_type)], bytes))
}

pub async fn xml(State(state): State<AppState>) -> Result<impl IntoResponse, HandlerError> {
    serve_document(&state.config.assets.templates_dir, XML).await
}

pub async fn html(State(state): State<AppState>) -> Result<impl IntoResponse, HandlerError> {
    serve_document(&state.config.assets.templates_dir, HTML).await
}

pub async fn json(State(state): State<AppState>) -> Result<impl IntoResponse, HandlerError> {
    serve_document(&state.config.assets.templates_dir, JSON).await
}

pub async fn deny(State(state): State<AppState>) -> Result<impl IntoResponse, HandlerError> {
    serve_document(&state.config.assets.templates_dir, DENY).await
}

pub async fn robots(State(state): State<AppState>) -> Result<impl IntoResponse, HandlerError> {
    serve_document(&state.config.assets.templates_dir, ROBOTS).await
}

async fn compressed(
    codec: Codec,
    state: AppState,
    ip: String,
    headers: &HeaderMap,
) -> Result<Representation, HandlerError> {
    let payload = CompressedEcho::new(codec, extract_headers(headers), ip);
    let synthesizer = state.synthesizer.clone();
    let representation = tokio::task::spawn_blocking(move || {
        synthesizer.synthesize(RepresentationRequest::Compression { codec, payload })
    })
    .await??;
    Ok(representation)
}

pub async fn gzip(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
) -> Result<Representation, HandlerError> {
    compressed(Codec::Gzip, state, ip, &headers).await
}

pub async fn brotli(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
) -> Result<Representation, HandlerError> {
    compressed(Codec::Brotli, state, ip, &headers).await
}

pub async fn deflate(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
) -> Result<Representation, HandlerError> {
    compressed(Codec::Deflate, state, ip, &headers).await
}

pub async fn zstd(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
) -> Result<Representation, HandlerError> {
    compressed(Codec::Zstd, state, ip, &headers).await
}
