//! Service metadata: landing page, about, heartbeat, sitemap and the
//! backup-mode redirect.

use axum::extract::State;
use axum::http::{header, HeaderMap, Uri};
use axum::response::{Html, IntoResponse, Redirect};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::health::HeartbeatResponse;
use crate::http::response::HandlerError;
use crate::http::server::AppState;

pub const SERVICE_NAME: &str = "ServeBin";
pub const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));
const DEVELOPER: &str = "Ayush Agnihotri <AyushAgnihotri2025>";
const CONTACT: &str = "contact@mrayush.me";
const SOURCE_CODE: &str = "https://github.com/AyushAgnihotri2025/ServeBin";

/// Parameter-free GET routes listed in the sitemap, in registration order.
pub const SITEMAP_ROUTES: &[&str] = &[
    "/",
    "/favicon.ico",
    "/about",
    "/heartbeat",
    "/ip",
    "/headers",
    "/user-agent",
    "/status",
    "/image",
    "/xml",
    "/html",
    "/json",
    "/deny",
    "/gzip",
    "/brotli",
    "/deflate",
    "/zstd",
    "/robots.txt",
    "/get",
];

const SITEMAP_HEADER: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" "#,
    r#"xmlns:news="http://www.google.com/schemas/sitemap-news/0.9" "#,
    r#"xmlns:xhtml="http://www.w3.org/1999/xhtml" "#,
    r#"xmlns:mobile="http://www.google.com/schemas/sitemap-mobile/1.0" "#,
    r#"xmlns:image="http://www.google.com/schemas/sitemap-image/1.1" "#,
    r#"xmlns:video="http://www.google.com/schemas/sitemap-video/1.1">"#,
);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutResponse {
    pub version: String,
    pub server_time: String,
    pub developer: String,
    pub contact: String,
    pub source_code: String,
}

pub async fn about() -> Json<AboutResponse> {
    Json(AboutResponse {
        version: VERSION.to_string(),
        server_time: Utc::now().to_string(),
        developer: DEVELOPER.to_string(),
        contact: CONTACT.to_string(),
        source_code: SOURCE_CODE.to_string(),
    })
}

pub async fn heartbeat(State(state): State<AppState>) -> Json<HeartbeatResponse> {
    Json(HeartbeatResponse::up(state.probe.snapshot().await))
}

/// Landing page. `{{ .Title }}` and `{{ .Version }}` in the template are
/// filled in.
pub async fn landing(State(state): State<AppState>) -> Result<Html<String>, HandlerError> {
    let path = state.config.assets.templates_dir.join("index.html");
    let template = tokio::fs::read_to_string(&path).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to read landing page");
        HandlerError::Asset("HTML")
    })?;

    Ok(Html(
        template
            .replace("{{ .Title }}", SERVICE_NAME)
            .replace("{{ .Version }}", VERSION.trim_start_matches('v')),
    ))
}

pub async fn sitemap(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(&state.config.listener.bind_address);
    let base = format!("{}://{}", state.config.public.scheme(), host);

    (
        [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
        render_sitemap(&base, SITEMAP_ROUTES),
    )
}

pub fn render_sitemap(base: &str, routes: &[&str]) -> String {
    let lastmod = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut xml = String::from(SITEMAP_HEADER);
    for route in routes {
        xml.push_str(&format!(
            "<url><loc>{base}{route}</loc><lastmod>{lastmod}</lastmod>\
             <changefreq>always</changefreq><priority>0.8</priority></url>"
        ));
    }
    xml.push_str("</urlset>");
    xml
}

/// Backup mode: send the client to the same path on the main server.
pub async fn redirect_to_main(State(state): State<AppState>, uri: Uri) -> Redirect {
    let target = format!(
        "{}{}",
        state.config.backup.main_server.trim_end_matches('/'),
        uri.path()
    );
    Redirect::temporary(&target)
}
