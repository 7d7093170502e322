//! ServeBin: an HTTP request and response service.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                    SERVEBIN                      │
//!                     │                                                  │
//!   Client Request    │  ┌─────────┐    ┌──────────────────┐             │
//!   ──────────────────┼─▶│  http   │───▶│    normalizer    │──▶ JSON     │
//!                     │  │ server  │    │ (args, headers,  │    echo     │
//!                     │  └────┬────┘    │  form, files)    │             │
//!                     │       │         └──────────────────┘             │
//!                     │       │         ┌──────────────────┐             │
//!                     │       └────────▶│    synthesis     │──▶ image /  │
//!                     │                 │ (images, codecs) │  compressed │
//!                     │                 └──────────────────┘             │
//!                     │                                                  │
//!                     │  ┌────────────────────────────────────────────┐  │
//!                     │  │          Cross-Cutting Concerns            │  │
//!                     │  │  config · security · health · lifecycle    │  │
//!                     │  │  observability (tracing + prometheus)      │  │
//!                     │  └────────────────────────────────────────────┘  │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use servebin::config::load_config;
use servebin::observability::{logging, metrics};
use servebin::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "servebin", version, about = "HTTP request and response service")]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "SERVEBIN_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "servebin starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        backup = config.backup.enabled,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(
        address = %format!("{}://{}", config.public.scheme(), local_addr),
        "Listening for connections"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let _signals = shutdown.trigger_on_signal();

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
