//! Client library for the FNA tumour classification service
//!
//! This crate provides the core functionality for:
//! - Typed access to the service's four endpoints
//! - Deadline-bound transport and error decoding
//! - Parsing and validation of the 30 diagnostic features
//! - A single-flight prediction workflow
//! - Metrics and structured logging

pub mod client;
pub mod decoder;
pub mod error;
pub mod features;
pub mod input;
pub mod models;
pub mod observability;
pub mod transport;
pub mod validation;
pub mod workflow;

pub use client::{ApiClient, ApiClientBuilder, ClientConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, ClientError};
pub use features::{feature_name, EXAMPLE_FEATURES, FEATURE_COUNT, FEATURE_NAMES};
pub use input::{InputError, RawFeatureInput};
pub use models::*;
pub use observability::{ClientMetrics, StructuredLogger};
pub use transport::{HttpRequest, HttpTransport, RawResponse, Transport, DEFAULT_TIMEOUT};
pub use validation::{validate, ValidationError, ValidationReason, ValidationReport};
pub use workflow::{
    FailureCategory, PredictionWorkflow, SubmitOutcome, WorkflowPhase, WorkflowSnapshot,
};
