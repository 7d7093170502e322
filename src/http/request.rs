//! Request identity: request IDs and the resolved client address.
//!
//! # Responsibilities
//! - Assign every request an `x-request-id` (kept when the client sent one)
//! - Echo the ID on the response and record it on the trace span
//! - Resolve the client IP once per request for the echo shapes
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The peer address comes from `ConnectInfo`; requests driven without a
//!   socket (router unit tests) resolve to an empty address

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{HeaderName, Request};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::Span;

use crate::http::server::AppState;
use crate::security::{resolve_client_ip, TrustedProxies};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// Span for `TraceLayer::make_span_with`, tagged with the request ID.
pub fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Originating client address, resolved through trusted proxies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let security = &state.config.security;
        Ok(ClientIp(resolve_client_ip(
            peer,
            &parts.headers,
            TrustedProxies::from_config(security.trusted_proxies.as_deref()),
            &security.remote_ip_headers,
        )))
    }
}
