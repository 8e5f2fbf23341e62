//! Prediction proxy - forwards browser-facing calls to the inference service

use anyhow::Result;
use predict_proxy::{api, config::ProxyConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const PROXY_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = ProxyConfig::load()?;
    info!(
        version = PROXY_VERSION,
        backend_url = %config.backend_url,
        port = config.port,
        timeout_ms = config.timeout_ms,
        "Starting predict-proxy"
    );

    let state = Arc::new(api::AppState::new(&config)?);
    api::serve(config.port, state).await?;

    info!("Shutting down");
    Ok(())
}
