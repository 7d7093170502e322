//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with every endpoint
//! - Wire up middleware (timeout, request ID, CORS, body limit, metrics,
//!   tracing)
//! - Bind the router to a listener and serve until shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use axum::routing::{any, delete, get, head, options, patch, post, put};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeFile;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServeBinConfig;
use crate::health::{SysinfoProbe, SystemProbe};
use crate::http::handlers::{formats, images, inspection, meta, methods, status};
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::normalizer::Normalizer;
use crate::observability::metrics::track_metrics;
use crate::security::apply_body_limit;
use crate::synthesis::Synthesizer;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServeBinConfig>,
    pub normalizer: Normalizer,
    pub synthesizer: Arc<Synthesizer>,
    pub probe: Arc<dyn SystemProbe>,
}

impl AppState {
    pub fn new(config: ServeBinConfig) -> Self {
        let probe = Arc::new(SysinfoProbe::new(&config.heartbeat));
        Self {
            normalizer: Normalizer::new(&config.security),
            synthesizer: Arc::new(Synthesizer::from_config(&config.images)),
            probe,
            config: Arc::new(config),
        }
    }
}

/// HTTP server for the echo service.
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServeBinConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }

    /// Replace the host probe behind `/heartbeat`.
    pub fn with_probe(mut self, probe: Arc<dyn SystemProbe>) -> Self {
        self.state.probe = probe;
        self
    }

    /// Replace the representation synthesizer.
    pub fn with_synthesizer(mut self, synthesizer: Synthesizer) -> Self {
        self.state.synthesizer = Arc::new(synthesizer);
        self
    }

    pub fn config(&self) -> &ServeBinConfig {
        &self.state.config
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn router(&self) -> Router {
        let config = &self.state.config;

        let mut router = Router::new()
            .route("/get", get(methods::param_echo))
            .route("/post", post(methods::body_echo))
            .route("/put", put(methods::body_echo))
            .route("/patch", patch(methods::body_echo))
            .route("/delete", delete(methods::body_echo))
            .route("/head", head(methods::header_echo))
            .route("/ip", get(inspection::ip))
            .route("/headers", get(inspection::headers))
            .route("/user-agent", get(inspection::user_agent))
            .route("/status", get(status::default_status))
            .route("/status/{code}", any(status::reflect_status))
            .route("/image", get(images::negotiated))
            .route("/image/{format}", get(images::explicit))
            .route("/xml", get(formats::xml))
            .route("/html", get(formats::html))
            .route("/json", get(formats::json))
            .route("/deny", get(formats::deny))
            .route("/robots.txt", get(formats::robots))
            .route("/gzip", get(formats::gzip))
            .route("/brotli", get(formats::brotli))
            .route("/deflate", get(formats::deflate))
            .route("/zstd", get(formats::zstd))
            .route("/about", get(meta::about))
            .route("/heartbeat", get(meta::heartbeat))
            .route_service("/favicon.ico", ServeFile::new(&config.assets.favicon));

        router = if config.backup.enabled {
            router
                .route("/", get(meta::redirect_to_main))
                .route("/sitemap.xml", get(meta::redirect_to_main))
        } else {
            router
                .route("/", get(meta::landing))
                .route("/sitemap.xml", get(meta::sitemap))
        };

        let mut router = self.finish_routes(router);
        if config.security.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        // CORS answers every OPTIONS request itself, so the options echo
        // is merged in after it.
        let router = router.merge(
            self.finish_routes(Router::new().route("/options", options(methods::header_echo))),
        );

        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(set_request_id_layer())
    }

    fn finish_routes(&self, routes: Router<AppState>) -> Router {
        apply_body_limit(
            routes
                .with_state(self.state.clone())
                .layer(middleware::from_fn(track_metrics)),
            &self.state.config.security,
        )
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backup = self.state.config.backup.enabled,
            "HTTP server starting"
        );

        let app = self
            .router()
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    fn router(cors_enabled: bool) -> Router {
        let mut config = ServeBinConfig::default();
        config.security.cors_enabled = cors_enabled;
        HttpServer::new(config).router()
    }

    #[tokio::test]
    async fn options_echo_is_not_swallowed_by_cors() {
        for cors_enabled in [true, false] {
            let response = router(cors_enabled)
                .oneshot(
                    Request::builder()
                        .method(Method::OPTIONS)
                        .uri("/options")
                        .header("x-mirror", "again")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()["x-mirror"], "again");
            assert_eq!(response.headers()["method"], "OPTIONS");
        }
    }

    #[tokio::test]
    async fn preflight_elsewhere_is_answered_by_cors() {
        let response = router(true)
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/get")
                    .header(header::ORIGIN, "https://example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
