//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::net::IpAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for servebin.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServeBinConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits and client address trust.
    pub security: SecurityConfig,

    /// Image synthesis settings.
    pub images: ImageConfig,

    /// Sample documents and static files.
    pub assets: AssetConfig,

    /// Heartbeat sampling settings.
    pub heartbeat: HeartbeatConfig,

    /// Backup server (redirect) mode.
    pub backup: BackupConfig,

    /// How the service is reached from outside.
    pub public: PublicConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8888").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8888".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request limits and proxy trust.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// In-memory budget for a multipart body in bytes.
    pub multipart_memory_limit: usize,

    /// Proxies whose forwarding headers are trusted.
    /// `None` trusts every peer, an empty list trusts none.
    pub trusted_proxies: Option<Vec<IpAddr>>,

    /// Headers consulted (in order) for the original client address.
    pub remote_ip_headers: Vec<String>,

    /// Attach permissive CORS headers to every response.
    pub cors_enabled: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 32 * 1024 * 1024,
            multipart_memory_limit: 10 << 20,
            trusted_proxies: None,
            remote_ip_headers: vec!["X-Forwarded-For".to_string(), "X-Real-IP".to_string()],
            cors_enabled: true,
        }
    }
}

/// Image synthesis configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageConfig {
    /// External AVIF encoder program.
    pub avif_encoder: PathBuf,

    /// Encoder arguments; `{input}` and `{output}` are replaced with the
    /// scratch file paths.
    pub avif_encoder_args: Vec<String>,

    /// Scratch directory for encoder round-trips.
    pub scratch_dir: PathBuf,

    /// Bitmap re-encoded for ICO responses.
    pub ico_source: PathBuf,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            avif_encoder: PathBuf::from("avifenc"),
            avif_encoder_args: vec![
                "{input}".to_string(),
                "-o".to_string(),
                "{output}".to_string(),
            ],
            scratch_dir: PathBuf::from(".cache"),
            ico_source: PathBuf::from("static/sample_image/sample.png"),
        }
    }
}

/// Static asset locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding the sample documents and the landing page.
    pub templates_dir: PathBuf,

    /// Favicon served at `/favicon.ico`.
    pub favicon: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates/sample"),
            favicon: PathBuf::from("static/logo/favicon.ico"),
        }
    }
}

/// Heartbeat configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    /// Window over which CPU load is sampled, in milliseconds.
    pub cpu_sample_ms: u64,

    /// URL probed for network latency. Latency is reported as zero when unset.
    pub latency_probe_url: Option<String>,

    /// Number of latency probes per heartbeat.
    pub latency_attempts: u32,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            cpu_sample_ms: 1000,
            latency_probe_url: None,
            latency_attempts: 5,
        }
    }
}

/// Backup server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BackupConfig {
    /// Redirect landing and sitemap requests to the main server.
    pub enabled: bool,

    /// Base URL of the main server (e.g., "https://servebin.dev").
    pub main_server: String,
}

/// Public-facing settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PublicConfig {
    /// Whether clients reach the service over TLS (affects generated links).
    pub ssl: bool,
}

impl PublicConfig {
    pub fn scheme(&self) -> &'static str {
        if self.ssl {
            "https"
        } else {
            "http"
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
