//! Response decoding and error-body normalisation
//!
//! The backend reports failures as `{"detail": ...}` where `detail` is either
//! a string or a list of `{"msg": ...}` objects. [`error_from_response`] turns
//! any status/body pair into an [`ApiError`] without ever failing itself.

use crate::error::ApiError;
use crate::transport::RawResponse;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a raw response into `T`, or classify it as an error
pub fn decode<T: DeserializeOwned>(response: RawResponse) -> Result<T, ApiError> {
    if !response.is_success() {
        return Err(error_from_response(
            response.status,
            &response.status_text,
            &response.body,
        ));
    }

    serde_json::from_slice(&response.body)
        .map_err(|e| ApiError::decode(format!("Failed to parse response: {}", e)))
}

/// Build the error for a non-2xx response
pub fn error_from_response(status: u16, status_text: &str, body: &[u8]) -> ApiError {
    let message = detail_message(body)
        .unwrap_or_else(|| format!("HTTP {}: {}", status, status_text));
    ApiError::http(status, message)
}

/// Extract a readable message from the `detail` field of an error body
pub fn detail_message(body: &[u8]) -> Option<String> {
    let parsed: Value = serde_json::from_slice(body).ok()?;
    match parsed.get("detail")? {
        Value::String(detail) if !detail.is_empty() => Some(detail.clone()),
        Value::Array(entries) if !entries.is_empty() => Some(
            entries
                .iter()
                .map(entry_message)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => None,
    }
}

fn entry_message(entry: &Value) -> String {
    match entry.get("msg") {
        Some(Value::String(msg)) if !msg.is_empty() => msg.clone(),
        _ => entry.to_string(),
    }
}
