//! Numeric validation of raw feature input
//!
//! Validation visits all 30 fields in order and accumulates every problem,
//! so one report describes all malformed fields at once.

use crate::features::FEATURE_NAMES;
use crate::input::RawFeatureInput;
use crate::models::FeatureVector;
use serde::Serialize;
use thiserror::Error;

/// Why a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationReason {
    Missing,
    NotANumber,
}

impl ValidationReason {
    fn describe(&self) -> &'static str {
        match self {
            ValidationReason::Missing => "is required",
            ValidationReason::NotANumber => "must be a valid number",
        }
    }
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("Feature {} ({}) {}", .field_index + 1, .field_name, .reason.describe())]
pub struct ValidationError {
    pub field_index: usize,
    pub field_name: &'static str,
    pub reason: ValidationReason,
}

/// Ordered list of rejected fields; empty means the input is submittable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// The first `limit` messages, plus a "... and N more" line if truncated
    pub fn summary(&self, limit: usize) -> Vec<String> {
        let mut lines: Vec<String> = self.errors.iter().take(limit).map(|e| e.to_string()).collect();
        if self.errors.len() > limit {
            lines.push(format!("... and {} more", self.errors.len() - limit));
        }
        lines
    }

    fn push(&mut self, field_index: usize, reason: ValidationReason) {
        self.errors.push(ValidationError {
            field_index,
            field_name: FEATURE_NAMES[field_index],
            reason,
        });
    }
}

/// Parse one token into a finite number
///
/// The whole token must be a number: this is stricter than prefix parsing,
/// so `"12abc"` is rejected rather than read as 12.
pub fn parse_feature(token: &str) -> Result<f64, ValidationReason> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(ValidationReason::Missing);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationReason::NotANumber),
    }
}

/// Turn raw input into a feature vector or a report of every bad field
pub fn validate(input: &RawFeatureInput) -> Result<FeatureVector, ValidationReport> {
    let mut report = ValidationReport::default();
    let mut values = Vec::with_capacity(input.tokens().len());

    for (index, token) in input.tokens().iter().enumerate() {
        match parse_feature(token) {
            Ok(value) => values.push(value),
            Err(reason) => report.push(index, reason),
        }
    }

    if !report.is_empty() {
        return Err(report);
    }

    // RawFeatureInput always holds 30 tokens and every value is finite here
    FeatureVector::new(values).map_err(|_| report)
}
