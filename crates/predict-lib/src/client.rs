//! API client for the inference service
//!
//! Each operation is a fixed (path, method) pair sent through a
//! [`Transport`] and decoded with [`decode`]. Calls are single attempts;
//! nothing is retried.

use crate::decoder::decode;
use crate::error::{ApiError, ClientError};
use crate::models::{ApiInfo, HealthStatus, ModelInfo, PredictionRequest, PredictionResponse};
use crate::observability::ClientMetrics;
use crate::transport::{HttpRequest, HttpTransport, Transport, DEFAULT_TIMEOUT};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Base URL used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Configuration for the API client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Service base URL (e.g., "http://localhost:8000")
    pub base_url: String,
    /// Deadline applied to every call
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Fully resolved URLs of the four operations
#[derive(Debug, Clone)]
struct Endpoints {
    root: Url,
    health: Url,
    model_info: Url,
    predict: Url,
}

impl Endpoints {
    fn resolve(base_url: &str) -> Result<Self, ClientError> {
        let join = |path: &str| {
            Url::parse(&format!("{}{}", base_url, path)).map_err(|source| {
                ClientError::InvalidBaseUrl {
                    url: base_url.to_string(),
                    source,
                }
            })
        };

        Ok(Self {
            root: join("/")?,
            health: join("/health")?,
            model_info: join("/model/info")?,
            predict: join("/predict")?,
        })
    }
}

/// Client for the inference service
///
/// Construct once and pass by reference; clones share the transport.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    endpoints: Endpoints,
    transport: Arc<dyn Transport>,
    metrics: ClientMetrics,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client backed by the default HTTP transport
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new()?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client with a substitute transport
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        let base_url = normalize_base_url(&config.base_url)?;
        let endpoints = Endpoints::resolve(&base_url)?;

        Ok(Self {
            base_url,
            timeout: config.timeout,
            endpoints,
            transport,
            metrics: ClientMetrics::new(),
        })
    }

    /// Base URL without trailing slashes
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `GET /` - service metadata
    pub async fn get_api_info(&self) -> Result<ApiInfo, ApiError> {
        let request = HttpRequest::get(self.endpoints.root.clone(), self.timeout);
        self.call("api_info", request).await
    }

    /// `GET /health` - service health
    pub async fn get_health(&self) -> Result<HealthStatus, ApiError> {
        let request = HttpRequest::get(self.endpoints.health.clone(), self.timeout);
        self.call("health", request).await
    }

    /// `GET /model/info` - active model metadata
    pub async fn get_model_info(&self) -> Result<ModelInfo, ApiError> {
        let request = HttpRequest::get(self.endpoints.model_info.clone(), self.timeout);
        self.call("model_info", request).await
    }

    /// `POST /predict` - classify one feature vector
    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| ApiError::decode(format!("Failed to encode request: {}", e)))?;
        let request = HttpRequest::post_json(self.endpoints.predict.clone(), body, self.timeout);

        let response: PredictionResponse = self.call("predict", request).await?;
        response.check().map_err(ApiError::decode)?;
        Ok(response)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: HttpRequest,
    ) -> Result<T, ApiError> {
        let started = Instant::now();
        let result = match self.transport.send(request).await {
            Ok(raw) => decode(raw),
            Err(err) => Err(err),
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(err) => err.kind(),
        };
        self.metrics
            .observe_request(operation, outcome, started.elapsed().as_secs_f64());

        result
    }
}

/// Builder for ApiClient configuration
#[derive(Default)]
pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl ApiClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<ApiClient, ClientError> {
        match self.transport {
            Some(transport) => ApiClient::with_transport(self.config, transport),
            None => ApiClient::new(self.config),
        }
    }
}

/// Strip trailing slashes and check the URL is usable
fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/').to_string();
    let parsed = Url::parse(&trimmed).map_err(|source| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(trimmed),
        other => Err(ClientError::UnsupportedScheme {
            url: raw.to_string(),
            scheme: other.to_string(),
        }),
    }
}
