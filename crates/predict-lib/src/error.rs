//! Error taxonomy for calls against the inference service

use thiserror::Error;

/// Message reported when a call exceeds its deadline
pub const TIMEOUT_MESSAGE: &str = "Request timeout";

/// Failure of a single API call
///
/// Every variant displays as the human-readable message that should reach
/// the operator; [`ApiError::status`] carries the HTTP status when a response
/// was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The deadline elapsed before a response arrived
    #[error("{}", TIMEOUT_MESSAGE)]
    Timeout,

    /// The transport failed before any response was received
    #[error("{message}")]
    Network { message: String },

    /// The service answered with a non-2xx status
    #[error("{message}")]
    Http { status: u16, message: String },

    /// A 2xx response whose body did not match the declared shape
    #[error("{message}")]
    Decode { message: String },
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network {
            message: message.into(),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        ApiError::Http {
            status,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        ApiError::Decode {
            message: message.into(),
        }
    }

    /// HTTP status of the response, `None` for network, timeout and decode failures
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout)
    }

    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Timeout => "timeout",
            ApiError::Network { .. } => "network",
            ApiError::Http { .. } => "http",
            ApiError::Decode { .. } => "decode",
        }
    }
}

/// Errors raised while constructing a client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme {scheme:?} in base URL {url:?}, expected http or https")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
