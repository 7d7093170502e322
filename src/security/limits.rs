//! Request body limits.
//!
//! # Design Decisions
//! - axum's own extractor limit is disabled and replaced by one
//!   tower-http limit, so every route shares the configured ceiling
//! - Oversized bodies are rejected with 413 before a handler runs

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::SecurityConfig;

/// Apply the configured body ceiling to every route of `router`.
pub fn apply_body_limit<S>(router: Router<S>, security: &SecurityConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(security.max_body_size))
}
