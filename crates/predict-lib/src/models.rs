//! Core data models exchanged with the inference service

use crate::features::FEATURE_COUNT;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Reasons a list of numbers is not a valid feature vector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureVectorError {
    #[error("expected 30 features, got {0}")]
    WrongLength(usize),
    #[error("feature {index} is not finite")]
    NonFinite { index: usize },
}

/// Exactly 30 finite measurements in feature order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>")]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Result<Self, FeatureVectorError> {
        let values: [f64; FEATURE_COUNT] = values
            .try_into()
            .map_err(|v: Vec<f64>| FeatureVectorError::WrongLength(v.len()))?;
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(FeatureVectorError::NonFinite { index });
        }
        Ok(Self(values))
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = FeatureVectorError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

/// Body of `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub features: FeatureVector,
}

/// Coarse confidence label supplied by the backend
///
/// Parsed case-insensitively. Values outside low/medium/high are kept as-is
/// so they can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Confidence {
    Low,
    Medium,
    High,
    Other(String),
}

impl From<String> for Confidence {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "low" => Confidence::Low,
            "medium" => Confidence::Medium,
            "high" => Confidence::High,
            _ => Confidence::Other(value),
        }
    }
}

impl From<Confidence> for String {
    fn from(value: Confidence) -> Self {
        match value {
            Confidence::Low => "low".to_string(),
            Confidence::Medium => "medium".to_string(),
            Confidence::High => "high".to_string(),
            Confidence::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => f.write_str("Low Confidence"),
            Confidence::Medium => f.write_str("Medium Confidence"),
            Confidence::High => f.write_str("High Confidence"),
            Confidence::Other(raw) => f.write_str(raw),
        }
    }
}

/// Decoded result of `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// 1 = malignant, 0 = benign
    pub prediction: u8,
    pub prediction_label: String,
    pub probability: f64,
    pub confidence: Confidence,
    pub model_version: String,
    pub api_version: String,
}

impl PredictionResponse {
    pub fn is_malignant(&self) -> bool {
        self.prediction == 1
    }

    /// Probability as a percentage string with two decimals
    pub fn probability_percent(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }

    /// Check the range invariants the wire format cannot express
    pub fn check(&self) -> Result<(), String> {
        if self.prediction > 1 {
            return Err(format!("prediction must be 0 or 1, got {}", self.prediction));
        }
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(format!(
                "probability must lie in [0, 1], got {}",
                self.probability
            ));
        }
        Ok(())
    }
}

/// Service status reported by `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
    Other(String),
}

impl From<String> for ServiceStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "healthy" => ServiceStatus::Healthy,
            "degraded" => ServiceStatus::Degraded,
            _ => ServiceStatus::Other(value),
        }
    }
}

impl From<ServiceStatus> for String {
    fn from(value: ServiceStatus) -> Self {
        match value {
            ServiceStatus::Healthy => "healthy".to_string(),
            ServiceStatus::Degraded => "degraded".to_string(),
            ServiceStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStatus::Healthy => f.write_str("healthy"),
            ServiceStatus::Degraded => f.write_str("degraded"),
            ServiceStatus::Other(raw) => f.write_str(raw),
        }
    }
}

/// Response of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: ServiceStatus,
    pub model_loaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoted_at: Option<String>,
}

impl HealthStatus {
    pub fn promoted_at_utc(&self) -> Option<DateTime<Utc>> {
        self.promoted_at.as_deref().and_then(parse_timestamp)
    }
}

/// Provenance of the active model version
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromotionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoted_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PromotionMetadata {
    pub fn is_empty(&self) -> bool {
        self.promoted_at.is_none()
            && self.promoted_by.is_none()
            && self.environment.is_none()
            && self.notes.is_none()
    }

    pub fn promoted_at_utc(&self) -> Option<DateTime<Utc>> {
        self.promoted_at.as_deref().and_then(parse_timestamp)
    }
}

/// Response of `GET /model/info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub model_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion_metadata: Option<PromotionMetadata>,
}

/// Response of `GET /`
///
/// Only `message` and `version` are interpreted; any other keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            // Backends often emit naive ISO timestamps without an offset
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
