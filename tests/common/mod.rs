//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use servebin::config::ServeBinConfig;
use servebin::health::{HeartbeatStats, NetworkLatency, SystemProbe};
use servebin::http::HttpServer;
use servebin::lifecycle::Shutdown;
use tokio::net::TcpListener;

/// A running server; dropping it shuts the server down.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Probe reporting fixed numbers.
pub struct FixedProbe;

#[async_trait]
impl SystemProbe for FixedProbe {
    async fn snapshot(&self) -> HeartbeatStats {
        HeartbeatStats {
            cpu_load: 12.5,
            physical_and_logical_cpu_count: 8,
            network_latency: NetworkLatency::from_samples(&[10.0, 20.0]),
            ..Default::default()
        }
    }
}

pub fn asset(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

/// Defaults with asset paths anchored at the crate root.
pub fn test_config() -> ServeBinConfig {
    let mut config = ServeBinConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.assets.templates_dir = asset("templates/sample");
    config.assets.favicon = asset("static/logo/favicon.ico");
    config.images.ico_source = asset("static/sample_image/sample.png");
    config
}

pub async fn spawn_server() -> TestServer {
    spawn_with(test_config()).await
}

pub async fn spawn_with(config: ServeBinConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).with_probe(Arc::new(FixedProbe));
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    TestServer {
        addr,
        client,
        shutdown,
    }
}
