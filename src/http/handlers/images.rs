//! `/image` and `/image/{format}`.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};

use crate::http::response::HandlerError;
use crate::http::server::AppState;
use crate::synthesis::{Representation, RepresentationRequest};

/// Format negotiated from `Accept`.
pub async fn negotiated(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Representation, HandlerError> {
    render(state, None, &headers).await
}

/// Format named by the path; unknown names are 406.
pub async fn explicit(
    State(state): State<AppState>,
    Path(format): Path<String>,
    headers: HeaderMap,
) -> Result<Representation, HandlerError> {
    render(state, Some(format), &headers).await
}

async fn render(
    state: AppState,
    format_token: Option<String>,
    headers: &HeaderMap,
) -> Result<Representation, HandlerError> {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let request = RepresentationRequest::Image {
        format_token,
        accept,
    };
    let synthesizer = state.synthesizer.clone();
    let representation =
        tokio::task::spawn_blocking(move || synthesizer.synthesize(request)).await??;
    Ok(representation)
}
