//! Request normalization subsystem.
//!
//! # Data Flow
//! ```text
//! axum Request + resolved client IP
//!     → extract.rs (query arguments, first-value headers, JSON body)
//!     → multipart.rs (form values, uploaded files)
//!     → RequestSnapshot (request-scoped, never shared)
//!     → shapes.rs (per-endpoint JSON shape)
//! ```
//!
//! # Design Decisions
//! - `normalize` is total: every extraction failure degrades its own field
//!   to empty and is logged, the request still succeeds
//! - A parsed multipart body counts as consumed, so `data` stays empty
//! - The client IP is opaque here; resolution lives in `security::headers`

pub mod extract;
pub mod multipart;
pub mod shapes;
pub mod snapshot;

use axum::body::{Body, Bytes};
use axum::http::header::CONTENT_TYPE;
use axum::http::Request;

use crate::config::SecurityConfig;
use self::extract::{extract_arguments, extract_headers, extract_json};
use self::multipart::{extract_multipart, is_multipart};

pub use shapes::{BodyEcho, CompressedEcho, HeadersEcho, IpEcho, ParamEcho, UserAgentEcho};
pub use snapshot::{FieldMap, FieldValue, FileEntry, HeaderSnapshot, RequestSnapshot};

/// Builds [`RequestSnapshot`]s under the configured body limits.
#[derive(Debug, Clone)]
pub struct Normalizer {
    body_limit: usize,
    multipart_memory_limit: u64,
}

impl Normalizer {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            body_limit: security.max_body_size,
            multipart_memory_limit: security.multipart_memory_limit as u64,
        }
    }

    /// Snapshot a request. Never fails.
    pub async fn normalize(&self, request: Request<Body>, client_ip: String) -> RequestSnapshot {
        let (parts, body) = request.into_parts();

        let body = match axum::body::to_bytes(body, self.body_limit).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read request body");
                Bytes::new()
            }
        };

        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());

        let mut snapshot = RequestSnapshot {
            arguments: extract_arguments(parts.uri.query()),
            headers: extract_headers(&parts.headers),
            client_ip,
            url: parts.uri.to_string(),
            method: parts.method.as_str().to_string(),
            ..Default::default()
        };

        if is_multipart(content_type) {
            let parsed = extract_multipart(
                content_type,
                body.clone(),
                self.body_limit as u64,
                self.multipart_memory_limit,
            )
            .await;
            match parsed {
                Ok(data) => {
                    snapshot.form = data.form;
                    snapshot.files = data.files;
                    return snapshot;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Multipart body not parsed, echoing raw body");
                }
            }
        }

        snapshot.raw_body = String::from_utf8_lossy(&body).into_owned();
        snapshot.parsed_json = extract_json(&body);
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    fn normalizer() -> Normalizer {
        Normalizer::new(&SecurityConfig::default())
    }

    #[tokio::test]
    async fn malformed_json_keeps_raw_body() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/post?x=1&x=2")
            .header("content-type", "application/json")
            .body(Body::from("{\"broken\": "))
            .unwrap();

        let snapshot = normalizer().normalize(request, "192.0.2.1".into()).await;
        assert_eq!(snapshot.raw_body, "{\"broken\": ");
        assert_eq!(snapshot.parsed_json, None);
        assert_eq!(
            snapshot.arguments["x"],
            FieldValue::Multiple(vec!["1".into(), "2".into()])
        );
        assert_eq!(snapshot.url, "/post?x=1&x=2");
        assert_eq!(snapshot.method, "POST");
        assert_eq!(snapshot.client_ip, "192.0.2.1");
    }

    #[tokio::test]
    async fn multipart_body_is_consumed_by_form() {
        let body = "--B\r\nContent-Disposition: form-data; name=\"k\"\r\n\r\nv\r\n--B--\r\n";
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/put")
            .header("content-type", "multipart/form-data; boundary=B")
            .body(Body::from(body))
            .unwrap();

        let snapshot = normalizer().normalize(request, String::new()).await;
        assert_eq!(snapshot.form["k"], FieldValue::Single("v".into()));
        assert!(snapshot.raw_body.is_empty());
        assert!(snapshot.parsed_json.is_none());
    }

    #[tokio::test]
    async fn upload_beyond_memory_threshold_is_still_a_file() {
        let content = vec![b'u'; 11 << 20];
        let mut body = b"--B\r\n\
            Content-Disposition: form-data; name=\"upload\"; filename=\"big.bin\"\r\n\
            Content-Type: application/octet-stream\r\n\r\n"
            .to_vec();
        body.extend_from_slice(&content);
        body.extend_from_slice(b"\r\n--B--\r\n");

        let request = Request::builder()
            .method(Method::POST)
            .uri("/post")
            .header("content-type", "multipart/form-data; boundary=B")
            .body(Body::from(body))
            .unwrap();

        let snapshot = normalizer().normalize(request, String::new()).await;
        let entry = &snapshot.files["upload"];
        assert_eq!(entry.filename, "big.bin");
        assert_eq!(entry.size, 11 << 20);
        assert!(snapshot.raw_body.is_empty());
    }

    #[tokio::test]
    async fn oversized_body_degrades_to_empty() {
        let mut security = SecurityConfig::default();
        security.max_body_size = 4;
        security.multipart_memory_limit = 4;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/post")
            .body(Body::from("{\"too\": \"long\"}"))
            .unwrap();

        let snapshot = Normalizer::new(&security)
            .normalize(request, String::new())
            .await;
        assert!(snapshot.raw_body.is_empty());
        assert!(snapshot.parsed_json.is_none());
        assert_eq!(snapshot.method, "POST");
    }
}
