//! Prediction workflow
//!
//! Drives one form of 30 feature fields through
//! `Idle -> Validating -> Submitting -> {Succeeded, Failed}` and turns every
//! failure into a single operator-facing message. Only one submission can be
//! in flight per workflow; a second submit during `Submitting` is ignored,
//! and a reply for input edited mid-flight is discarded.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::input::{InputError, RawFeatureInput};
use crate::models::{PredictionRequest, PredictionResponse};
use crate::observability::StructuredLogger;
use crate::validation::{self, ValidationReport};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::debug;

/// Where the workflow currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Operator-facing category of a failed submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "category", content = "message", rename_all = "snake_case")]
pub enum FailureCategory {
    /// 503: the backend has no model loaded yet
    ModelNotLoaded,
    /// 422: the backend rejected the features, with its message
    InvalidInput(String),
    /// Any other 5xx
    ServerError,
    /// Timeouts, network failures and remaining statuses, message passed through
    Other(String),
}

impl FailureCategory {
    pub fn from_error(error: &ApiError) -> Self {
        match error.status() {
            Some(503) => FailureCategory::ModelNotLoaded,
            Some(422) => FailureCategory::InvalidInput(error.to_string()),
            Some(status) if status >= 500 => FailureCategory::ServerError,
            _ => FailureCategory::Other(error.to_string()),
        }
    }

    pub fn message(&self) -> String {
        match self {
            FailureCategory::ModelNotLoaded => {
                "Model not loaded. Please wait for the model to load and try again.".to_string()
            }
            FailureCategory::InvalidInput(message) if message.is_empty() => {
                "Validation error: Invalid input data".to_string()
            }
            FailureCategory::InvalidInput(message) => message.clone(),
            FailureCategory::ServerError => "Server error. Please try again later.".to_string(),
            FailureCategory::Other(message) if message.is_empty() => {
                "Failed to make prediction".to_string()
            }
            FailureCategory::Other(message) => message.clone(),
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Result of one call to [`PredictionWorkflow::submit`]
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Another submission was already in flight
    Ignored,
    /// Client-side validation failed; nothing was sent
    Invalid(ValidationReport),
    Succeeded(PredictionResponse),
    /// The input was edited while the request was in flight; the reply was dropped
    Superseded,
    Failed {
        category: FailureCategory,
        error: ApiError,
    },
}

/// Read-only view of the workflow for renderers
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSnapshot {
    pub input: RawFeatureInput,
    pub phase: WorkflowPhase,
    pub report: ValidationReport,
    pub result: Option<PredictionResponse>,
    pub error: Option<String>,
    pub can_submit: bool,
}

#[derive(Debug, Default)]
struct FormState {
    input: RawFeatureInput,
    phase: Option<WorkflowPhase>,
    report: ValidationReport,
    result: Option<PredictionResponse>,
    error: Option<String>,
    /// Bumped on every edit so in-flight replies can tell they are stale
    generation: u64,
}

impl FormState {
    /// Drop everything derived from the previous input
    fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.report = ValidationReport::default();
        self.result = None;
        self.error = None;
        if matches!(
            self.phase,
            Some(WorkflowPhase::Succeeded) | Some(WorkflowPhase::Failed)
        ) {
            self.phase = Some(WorkflowPhase::Idle);
        }
    }
}

/// Clears the in-flight flag when a submission ends or is cancelled
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Single-shot, re-entrant prediction workflow over one form
pub struct PredictionWorkflow {
    client: ApiClient,
    state: RwLock<FormState>,
    in_flight: AtomicBool,
    logger: StructuredLogger,
}

impl PredictionWorkflow {
    pub fn new(client: ApiClient) -> Self {
        Self::with_logger(client, StructuredLogger::new("workflow"))
    }

    pub fn with_logger(client: ApiClient, logger: StructuredLogger) -> Self {
        Self {
            client,
            state: RwLock::new(FormState::default()),
            in_flight: AtomicBool::new(false),
            logger,
        }
    }

    /// True while a request is outstanding
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Edit one field; clears any stale report, result and error
    pub async fn set_field(&self, index: usize, value: impl Into<String>) -> Result<(), InputError> {
        let mut state = self.state.write().await;
        state.input.set(index, value)?;
        state.invalidate();
        Ok(())
    }

    /// Replace all 30 fields from pasted text, or none of them
    pub async fn apply_bulk(&self, text: &str) -> Result<(), InputError> {
        let mut state = self.state.write().await;
        match RawFeatureInput::parse_bulk(text) {
            Ok(input) => {
                state.input = input;
                state.invalidate();
                Ok(())
            }
            Err(err) => {
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Reset to the reference sample
    pub async fn load_example(&self) {
        self.reset(RawFeatureInput::example()).await;
    }

    /// Reset to 30 empty fields
    pub async fn clear(&self) {
        self.reset(RawFeatureInput::empty()).await;
    }

    async fn reset(&self, input: RawFeatureInput) {
        let mut state = self.state.write().await;
        state.input = input;
        state.invalidate();
    }

    pub async fn can_submit(&self) -> bool {
        let state = self.state.read().await;
        !self.is_submitting() && state.input.is_complete() && state.report.is_empty()
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        let state = self.state.read().await;
        let submitting = self.is_submitting();

        // A cancelled submission leaves Submitting behind without a request
        let phase = match state.phase.unwrap_or(WorkflowPhase::Idle) {
            WorkflowPhase::Submitting | WorkflowPhase::Validating if !submitting => {
                WorkflowPhase::Idle
            }
            phase => phase,
        };

        WorkflowSnapshot {
            input: state.input.clone(),
            phase,
            report: state.report.clone(),
            result: state.result.clone(),
            error: state.error.clone(),
            can_submit: !submitting && state.input.is_complete() && state.report.is_empty(),
        }
    }

    /// Validate the current input and, if clean, send it for prediction
    pub async fn submit(&self) -> SubmitOutcome {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("Submission already in flight, ignoring");
            return SubmitOutcome::Ignored;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let (features, generation) = {
            let mut state = self.state.write().await;
            state.phase = Some(WorkflowPhase::Validating);
            state.result = None;
            state.error = None;

            match validation::validate(&state.input) {
                Ok(features) => {
                    state.report = ValidationReport::default();
                    state.phase = Some(WorkflowPhase::Submitting);
                    (features, state.generation)
                }
                Err(report) => {
                    self.logger.log_validation_failed(&report);
                    state.report = report.clone();
                    state.phase = Some(WorkflowPhase::Idle);
                    return SubmitOutcome::Invalid(report);
                }
            }
        };

        self.logger.log_submitted(self.client.base_url());
        let started = Instant::now();
        let result = self.client.predict(&PredictionRequest { features }).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(elapsed_ms, "Input changed during submission, discarding reply");
            state.phase = Some(WorkflowPhase::Idle);
            return SubmitOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                self.logger.log_completed(&response, elapsed_ms);
                state.phase = Some(WorkflowPhase::Succeeded);
                state.result = Some(response.clone());
                state.error = None;
                SubmitOutcome::Succeeded(response)
            }
            Err(error) => {
                self.logger.log_failed(&error, elapsed_ms);
                let category = FailureCategory::from_error(&error);
                state.phase = Some(WorkflowPhase::Failed);
                state.result = None;
                state.error = Some(category.message());
                SubmitOutcome::Failed { category, error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiClientBuilder;
    use crate::features::{EXAMPLE_FEATURES, FEATURE_COUNT};
    use crate::transport::{HttpRequest, RawResponse, Transport};
    use crate::validation::ValidationReason;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    const PREDICTION_BODY: &str = r#"{"prediction":1,"prediction_label":"Malignant","probability":0.87,"confidence":"High","model_version":"v3","api_version":"1.0"}"#;

    /// Replies with a fixed outcome and counts calls
    struct StaticTransport {
        outcome: Result<RawResponse, ApiError>,
        calls: AtomicUsize,
    }

    impl StaticTransport {
        fn reply(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                outcome: Ok(RawResponse::new(status, body)),
                calls: AtomicUsize::new(0),
            })
        }

        fn fail(error: ApiError) -> Arc<Self> {
            Arc::new(Self {
                outcome: Err(error),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for StaticTransport {
        async fn send(&self, _request: HttpRequest) -> Result<RawResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    /// Holds the request until released
    struct GatedTransport {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn send(&self, _request: HttpRequest) -> Result<RawResponse, ApiError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(RawResponse::new(200, PREDICTION_BODY))
        }
    }

    fn workflow_with(transport: Arc<dyn Transport>) -> PredictionWorkflow {
        let client = ApiClientBuilder::new().transport(transport).build().unwrap();
        PredictionWorkflow::new(client)
    }

    async fn submit_example_against(status: u16, body: &str) -> SubmitOutcome {
        let workflow = workflow_with(StaticTransport::reply(status, body));
        workflow.load_example().await;
        workflow.submit().await
    }

    #[tokio::test]
    async fn test_validation_failure_skips_network() {
        let transport = StaticTransport::reply(200, PREDICTION_BODY);
        let workflow = workflow_with(transport.clone());
        workflow.load_example().await;
        workflow.set_field(3, "").await.unwrap();
        workflow.set_field(7, "abc").await.unwrap();

        let outcome = workflow.submit().await;

        let SubmitOutcome::Invalid(report) = outcome else {
            panic!("expected validation failure");
        };
        assert_eq!(report.len(), 2);
        assert_eq!(report.errors()[0].reason, ValidationReason::Missing);
        assert_eq!(report.errors()[1].reason, ValidationReason::NotANumber);
        assert_eq!(transport.calls(), 0);

        let snapshot = workflow.snapshot().await;
        assert_eq!(snapshot.phase, WorkflowPhase::Idle);
        assert_eq!(snapshot.report, report);
        assert!(!snapshot.can_submit);
    }

    #[tokio::test]
    async fn test_success_stores_result() {
        let workflow = workflow_with(StaticTransport::reply(200, PREDICTION_BODY));
        workflow.load_example().await;

        let outcome = workflow.submit().await;
        let SubmitOutcome::Succeeded(response) = outcome else {
            panic!("expected success");
        };
        assert_eq!(response.probability, 0.87);
        assert!(response.is_malignant());

        let snapshot = workflow.snapshot().await;
        assert_eq!(snapshot.phase, WorkflowPhase::Succeeded);
        assert_eq!(snapshot.result, Some(response));
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_503_maps_to_model_not_loaded() {
        let outcome = submit_example_against(503, r#"{"detail":"model not loaded"}"#).await;
        let SubmitOutcome::Failed { category, error } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(category, FailureCategory::ModelNotLoaded);
        assert_eq!(error.status(), Some(503));
        assert_eq!(
            category.message(),
            "Model not loaded. Please wait for the model to load and try again."
        );
    }

    #[tokio::test]
    async fn test_422_uses_server_message() {
        let outcome = submit_example_against(
            422,
            r#"{"detail":[{"msg":"Expected 30 features"}]}"#,
        )
        .await;
        let SubmitOutcome::Failed { category, .. } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(
            category,
            FailureCategory::InvalidInput("Expected 30 features".to_string())
        );
        assert_eq!(category.message(), "Expected 30 features");
    }

    #[tokio::test]
    async fn test_500_unparsable_maps_to_server_error() {
        let outcome = submit_example_against(500, "Internal Server Error").await;
        let SubmitOutcome::Failed { category, .. } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(category, FailureCategory::ServerError);
        assert_eq!(category.message(), "Server error. Please try again later.");
    }

    #[tokio::test]
    async fn test_other_statuses_pass_message_through() {
        let outcome = submit_example_against(404, r#"{"detail":"Not Found"}"#).await;
        let SubmitOutcome::Failed { category, .. } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(category, FailureCategory::Other("Not Found".to_string()));
    }

    #[tokio::test]
    async fn test_timeout_and_network_pass_through() {
        for error in [ApiError::Timeout, ApiError::network("connection refused")] {
            let workflow = workflow_with(StaticTransport::fail(error.clone()));
            workflow.load_example().await;

            let outcome = workflow.submit().await;
            let SubmitOutcome::Failed { category, .. } = outcome else {
                panic!("expected failure");
            };
            assert_eq!(category, FailureCategory::Other(error.to_string()));

            let snapshot = workflow.snapshot().await;
            assert_eq!(snapshot.phase, WorkflowPhase::Failed);
            assert_eq!(snapshot.error, Some(error.to_string()));
        }
    }

    #[test]
    fn test_empty_messages_get_fallbacks() {
        assert_eq!(
            FailureCategory::InvalidInput(String::new()).message(),
            "Validation error: Invalid input data"
        );
        assert_eq!(
            FailureCategory::Other(String::new()).message(),
            "Failed to make prediction"
        );
        assert_eq!(
            FailureCategory::from_error(&ApiError::http(502, "bad gateway")),
            FailureCategory::ServerError
        );
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_ignored() {
        let transport = Arc::new(GatedTransport {
            started: Notify::new(),
            release: Notify::new(),
        });
        let workflow = Arc::new(workflow_with(transport.clone()));
        workflow.load_example().await;

        let first = {
            let workflow = workflow.clone();
            tokio::spawn(async move { workflow.submit().await })
        };
        transport.started.notified().await;

        assert!(workflow.is_submitting());
        assert_eq!(workflow.snapshot().await.phase, WorkflowPhase::Submitting);
        assert!(!workflow.can_submit().await);
        assert_eq!(workflow.submit().await, SubmitOutcome::Ignored);

        transport.release.notify_one();
        let outcome = first.await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Succeeded(_)));
        assert!(!workflow.is_submitting());
        assert!(workflow.can_submit().await);
    }

    #[tokio::test]
    async fn test_edit_during_submit_discards_stale_reply() {
        let transport = Arc::new(GatedTransport {
            started: Notify::new(),
            release: Notify::new(),
        });
        let workflow = Arc::new(workflow_with(transport.clone()));
        workflow.load_example().await;

        let first = {
            let workflow = workflow.clone();
            tokio::spawn(async move { workflow.submit().await })
        };
        transport.started.notified().await;

        workflow.set_field(0, "99").await.unwrap();
        transport.release.notify_one();

        assert_eq!(first.await.unwrap(), SubmitOutcome::Superseded);
        let snapshot = workflow.snapshot().await;
        assert_eq!(snapshot.input.get(0), Some("99"));
        assert_eq!(snapshot.phase, WorkflowPhase::Idle);
        assert!(snapshot.result.is_none());
        assert!(snapshot.error.is_none());
        assert!(snapshot.can_submit);
    }

    #[tokio::test]
    async fn test_cancelled_submit_releases_workflow() {
        let transport = Arc::new(GatedTransport {
            started: Notify::new(),
            release: Notify::new(),
        });
        let workflow = workflow_with(transport);
        workflow.load_example().await;

        let result = tokio::time::timeout(Duration::from_millis(50), workflow.submit()).await;
        assert!(result.is_err());

        assert!(!workflow.is_submitting());
        assert_eq!(workflow.snapshot().await.phase, WorkflowPhase::Idle);
    }

    #[tokio::test]
    async fn test_load_example_resets_report_and_result() {
        let workflow = workflow_with(StaticTransport::reply(200, PREDICTION_BODY));
        workflow.submit().await;
        assert_eq!(workflow.snapshot().await.report.len(), FEATURE_COUNT);

        workflow.load_example().await;
        let snapshot = workflow.snapshot().await;
        assert!(snapshot.report.is_empty());
        assert!(snapshot.result.is_none());
        assert_eq!(snapshot.input, RawFeatureInput::example());
        assert_eq!(
            validation::validate(&snapshot.input).unwrap().as_slice(),
            &EXAMPLE_FEATURES[..]
        );
        assert!(snapshot.can_submit);
    }

    #[tokio::test]
    async fn test_clear_empties_every_field() {
        let workflow = workflow_with(StaticTransport::reply(200, PREDICTION_BODY));
        workflow.load_example().await;
        workflow.submit().await;

        workflow.clear().await;
        let snapshot = workflow.snapshot().await;
        assert_eq!(snapshot.input, RawFeatureInput::empty());
        assert!(snapshot.result.is_none());
        assert!(!snapshot.can_submit);
    }

    #[tokio::test]
    async fn test_edit_after_success_clears_result_only() {
        let workflow = workflow_with(StaticTransport::reply(200, PREDICTION_BODY));
        workflow.load_example().await;
        workflow.submit().await;

        workflow.set_field(0, "18.5").await.unwrap();

        let snapshot = workflow.snapshot().await;
        assert!(snapshot.result.is_none());
        assert!(snapshot.report.is_empty());
        assert_eq!(snapshot.phase, WorkflowPhase::Idle);
        assert_eq!(snapshot.input.get(0), Some("18.5"));
        for i in 1..FEATURE_COUNT {
            assert_eq!(snapshot.input.get(i), RawFeatureInput::example().get(i));
        }
    }

    #[tokio::test]
    async fn test_edit_after_failure_clears_error_and_report() {
        let workflow = workflow_with(StaticTransport::reply(500, ""));
        workflow.load_example().await;
        workflow.set_field(1, "x").await.unwrap();
        workflow.submit().await;
        assert_eq!(workflow.snapshot().await.report.len(), 1);

        workflow.set_field(1, "10.38").await.unwrap();
        workflow.submit().await;
        assert_eq!(workflow.snapshot().await.phase, WorkflowPhase::Failed);

        workflow.set_field(2, "122.8").await.unwrap();
        let snapshot = workflow.snapshot().await;
        assert!(snapshot.error.is_none());
        assert!(snapshot.report.is_empty());
        assert_eq!(snapshot.phase, WorkflowPhase::Idle);
    }

    #[tokio::test]
    async fn test_bulk_mismatch_leaves_fields_untouched() {
        let workflow = workflow_with(StaticTransport::reply(200, PREDICTION_BODY));
        workflow.load_example().await;

        let text = vec!["1.0"; 29].join(", ");
        let err = workflow.apply_bulk(&text).await.unwrap_err();
        assert_eq!(err, InputError::CountMismatch { actual: 29 });

        let snapshot = workflow.snapshot().await;
        assert_eq!(snapshot.input, RawFeatureInput::example());
        assert_eq!(snapshot.error.as_deref(), Some("Expected 30 values, got 29"));
    }

    #[tokio::test]
    async fn test_bulk_then_submit() {
        let workflow = workflow_with(StaticTransport::reply(200, PREDICTION_BODY));
        let text = EXAMPLE_FEATURES
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");

        workflow.apply_bulk(&text).await.unwrap();
        assert!(workflow.can_submit().await);
        assert!(matches!(workflow.submit().await, SubmitOutcome::Succeeded(_)));
    }
}
