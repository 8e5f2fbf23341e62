//! HTTP API: pass-through routes and Prometheus metrics

use crate::config::ProxyConfig;
use crate::metrics::ProxyMetrics;
use anyhow::Context;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use predict_lib::{HttpRequest, HttpTransport, Transport};
use prometheus::{Encoder, TextEncoder};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Body detail returned whenever the backend cannot be relayed
pub const BACKEND_UNAVAILABLE: &str = "Failed to connect to backend API";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    transport: Arc<dyn Transport>,
    root_url: Url,
    predict_url: Url,
    timeout: Duration,
    pub metrics: ProxyMetrics,
}

impl AppState {
    /// State forwarding over HTTP to the configured backend
    pub fn new(config: &ProxyConfig) -> anyhow::Result<Self> {
        let transport = HttpTransport::new().context("Failed to create HTTP transport")?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(
        config: &ProxyConfig,
        transport: Arc<dyn Transport>,
    ) -> anyhow::Result<Self> {
        let base = config.backend_url.trim().trim_end_matches('/');
        let parse = |path: &str| {
            Url::parse(&format!("{}{}", base, path))
                .with_context(|| format!("Invalid backend URL {:?}", config.backend_url))
        };

        Ok(Self {
            transport,
            root_url: parse("/")?,
            predict_url: parse("/predict")?,
            timeout: config.timeout(),
            metrics: ProxyMetrics::new(),
        })
    }
}

fn backend_unavailable() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": BACKEND_UNAVAILABLE })),
    )
        .into_response()
}

/// Send one request to the backend and relay its JSON body and status
async fn relay(state: &AppState, route: &'static str, request: HttpRequest) -> Response {
    let response = match state.transport.send(request).await {
        Ok(raw) => match serde_json::from_slice::<Value>(&raw.body) {
            Ok(body) => {
                debug!(route, status = raw.status, "Relaying backend response");
                let status = StatusCode::from_u16(raw.status).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, Json(body)).into_response()
            }
            Err(err) => {
                warn!(route, status = raw.status, error = %err, "Backend returned a non-JSON body");
                backend_unavailable()
            }
        },
        Err(err) => {
            warn!(route, kind = err.kind(), error = %err, "Backend request failed");
            backend_unavailable()
        }
    };

    state
        .metrics
        .record_forwarded(route, response.status().as_u16());
    response
}

/// `GET /` forwarded to the backend root
async fn forward_root(State(state): State<Arc<AppState>>) -> Response {
    let request = HttpRequest::get(state.root_url.clone(), state.timeout);
    relay(&state, "root", request).await
}

/// `POST /predict` forwarded with the body unchanged
///
/// A body that is not JSON is answered locally without contacting the backend.
async fn forward_predict(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    if let Err(err) = serde_json::from_slice::<Value>(&body) {
        warn!(route = "predict", error = %err, "Client sent a non-JSON body");
        let response = backend_unavailable();
        state
            .metrics
            .record_forwarded("predict", response.status().as_u16());
        return response;
    }

    let request = HttpRequest::post_json(state.predict_url.clone(), body.to_vec(), state.timeout);
    relay(&state, "predict", request).await
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %err, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(forward_root))
        .route("/predict", post(forward_predict))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the proxy server and run until Ctrl-C
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting proxy server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Proxy server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => {
            warn!(error = %err, "Failed to listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
