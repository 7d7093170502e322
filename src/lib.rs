//! ServeBin: HTTP request echo and representation service library.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod normalizer;
pub mod observability;
pub mod security;
pub mod synthesis;

pub use config::ServeBinConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
