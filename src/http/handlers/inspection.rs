//! Request inspection: `/ip`, `/headers`, `/user-agent`.

use axum::http::{header, HeaderMap};
use axum::Json;

use crate::http::request::ClientIp;
use crate::normalizer::extract::extract_headers;
use crate::normalizer::{HeadersEcho, IpEcho, UserAgentEcho};

pub async fn ip(ClientIp(ip): ClientIp) -> Json<IpEcho> {
    Json(IpEcho::new(ip))
}

pub async fn headers(headers: HeaderMap) -> Json<HeadersEcho> {
    Json(HeadersEcho {
        headers: extract_headers(&headers),
    })
}

pub async fn user_agent(headers: HeaderMap) -> Json<UserAgentEcho> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_default();
    Json(UserAgentEcho { user_agent })
}
