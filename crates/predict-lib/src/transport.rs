//! Deadline-bound HTTP transport
//!
//! A transport issues exactly one outbound request and produces exactly one
//! outcome: a raw response, [`ApiError::Timeout`] or [`ApiError::Network`].
//! The deadline covers connecting, sending and reading the full body. When it
//! fires the in-flight future is dropped, which closes the connection, so a
//! late response can never be delivered.

use crate::error::{ApiError, ClientError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default per-request deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// HTTP methods used against the inference service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A single outbound request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub deadline: Duration,
}

impl HttpRequest {
    pub fn get(url: Url, deadline: Duration) -> Self {
        Self {
            method: Method::Get,
            url,
            headers: Vec::new(),
            body: None,
            deadline,
        }
    }

    pub fn post_json(url: Url, body: Vec<u8>, deadline: Duration) -> Self {
        Self {
            method: Method::Post,
            url,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
            deadline,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Status line and body of a received response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            status_text,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Trait for request transports
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and wait for the response or the deadline
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, ApiError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    async fn execute(&self, request: HttpRequest) -> Result<RawResponse, ApiError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: body.to_vec(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, ApiError> {
        let deadline = request.deadline;
        let method = request.method;
        let url = request.url.to_string();

        debug!(method = method.as_str(), url = %url, deadline_ms = deadline.as_millis() as u64, "Sending request");

        match tokio::time::timeout(deadline, self.execute(request)).await {
            Ok(Ok(response)) => {
                debug!(method = method.as_str(), url = %url, status = response.status, "Received response");
                Ok(response)
            }
            Ok(Err(err)) => {
                warn!(method = method.as_str(), url = %url, error = %err, "Request failed");
                Err(err)
            }
            Err(_) => {
                warn!(method = method.as_str(), url = %url, deadline_ms = deadline.as_millis() as u64, "Request deadline elapsed");
                Err(ApiError::Timeout)
            }
        }
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::network(err.to_string())
    }
}
