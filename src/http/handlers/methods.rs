//! HTTP method echoes: `/get`, `/post`, `/put`, `/patch`, `/delete`,
//! `/head` and `/options`.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::http::request::ClientIp;
use crate::http::server::AppState;
use crate::normalizer::{BodyEcho, ParamEcho};

/// Request headers never mirrored onto a response: they describe the
/// request's own framing and would corrupt ours.
const UNMIRRORED: [HeaderName; 5] = [
    header::CONNECTION,
    header::CONTENT_LENGTH,
    header::CONTENT_TYPE,
    header::TRANSFER_ENCODING,
    header::HOST,
];

pub async fn param_echo(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    request: Request,
) -> Json<ParamEcho> {
    let snapshot = state.normalizer.normalize(request, ip).await;
    Json(ParamEcho::from(snapshot))
}

pub async fn body_echo(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    request: Request,
) -> Json<BodyEcho> {
    let snapshot = state.normalizer.normalize(request, ip).await;
    Json(BodyEcho::from(snapshot))
}

/// Mirror request headers onto the response, plus `origin`, `url` and
/// `method`. The body is JSON `null`.
pub async fn header_echo(ClientIp(ip): ClientIp, request: Request<Body>) -> Response {
    let mut mirrored = HeaderMap::new();
    for (name, value) in request.headers() {
        if !UNMIRRORED.contains(name) {
            mirrored.append(name.clone(), value.clone());
        }
    }

    let extra = [
        ("origin", ip),
        ("url", request.uri().to_string()),
        ("method", request.method().to_string()),
    ];
    for (name, value) in extra {
        if let Ok(value) = HeaderValue::from_str(&value) {
            mirrored.insert(name, value);
        }
    }

    (mirrored, Json(serde_json::Value::Null)).into_response()
}
