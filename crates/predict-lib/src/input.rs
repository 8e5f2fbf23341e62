//! Raw feature input: per-field tokens and bulk-pasted text

use crate::features::{EXAMPLE_FEATURES, FEATURE_COUNT};
use thiserror::Error;

/// Errors raised while turning text into 30 raw tokens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter values to paste")]
    Empty,
    #[error("Expected 30 values, got {actual}")]
    CountMismatch { actual: usize },
    #[error("Feature index {index} is out of range (expected 0-29)")]
    IndexOutOfRange { index: usize },
}

/// One text token per feature, possibly empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFeatureInput {
    tokens: Vec<String>,
}

impl Default for RawFeatureInput {
    fn default() -> Self {
        Self::empty()
    }
}

impl RawFeatureInput {
    /// Thirty empty fields
    pub fn empty() -> Self {
        Self {
            tokens: vec![String::new(); FEATURE_COUNT],
        }
    }

    /// The reference sample, rendered as text
    pub fn example() -> Self {
        Self {
            tokens: EXAMPLE_FEATURES.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Take one token per field as-is
    pub fn from_fields<I, S>(fields: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = fields.into_iter().map(Into::into).collect();
        if tokens.len() != FEATURE_COUNT {
            return Err(InputError::CountMismatch {
                actual: tokens.len(),
            });
        }
        Ok(Self { tokens })
    }

    /// Split pasted text on runs of commas and/or whitespace
    ///
    /// Either all 30 tokens are produced or an error is returned.
    pub fn parse_bulk(text: &str) -> Result<Self, InputError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(InputError::Empty);
        }

        let tokens: Vec<String> = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();

        if tokens.len() != FEATURE_COUNT {
            return Err(InputError::CountMismatch {
                actual: tokens.len(),
            });
        }
        Ok(Self { tokens })
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// Replace the token of a single field
    pub fn set(&mut self, index: usize, value: impl Into<String>) -> Result<(), InputError> {
        let slot = self
            .tokens
            .get_mut(index)
            .ok_or(InputError::IndexOutOfRange { index })?;
        *slot = value.into();
        Ok(())
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// True when no field is blank
    pub fn is_complete(&self) -> bool {
        self.tokens.iter().all(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("{}.5", i)).collect()
    }

    #[test]
    fn test_bulk_comma_separated() {
        let text = numbers(30).join(",");
        let input = RawFeatureInput::parse_bulk(&text).unwrap();
        assert_eq!(input.tokens(), numbers(30).as_slice());
    }

    #[test]
    fn test_bulk_mixed_separators() {
        let text = format!(
            "  {}\n\t{} , ,{}  ",
            numbers(10).join(", "),
            numbers(10).join("  "),
            numbers(10).join(",\n")
        );
        let input = RawFeatureInput::parse_bulk(&text).unwrap();
        assert_eq!(input.tokens().len(), 30);
        assert!(input.tokens().iter().all(|t| !t.is_empty()));
    }

    #[test]
    fn test_bulk_count_mismatch_names_actual_count() {
        for count in [29, 31] {
            let err = RawFeatureInput::parse_bulk(&numbers(count).join(" ")).unwrap_err();
            assert_eq!(err, InputError::CountMismatch { actual: count });
            assert_eq!(err.to_string(), format!("Expected 30 values, got {}", count));
        }
    }

    #[test]
    fn test_bulk_blank_input() {
        assert_eq!(RawFeatureInput::parse_bulk(" \n\t "), Err(InputError::Empty));
        assert_eq!(
            RawFeatureInput::parse_bulk(",,,"),
            Err(InputError::CountMismatch { actual: 0 })
        );
    }

    #[test]
    fn test_bulk_matches_field_by_field_entry() {
        let bulk = RawFeatureInput::parse_bulk(&numbers(30).join(", ")).unwrap();

        let mut fields = RawFeatureInput::empty();
        for (i, value) in numbers(30).into_iter().enumerate() {
            fields.set(i, value).unwrap();
        }

        assert_eq!(bulk, fields);
    }

    #[test]
    fn test_example_renders_reference_values() {
        let input = RawFeatureInput::example();
        assert_eq!(input.get(0), Some("17.99"));
        assert_eq!(input.get(3), Some("1001"));
        assert!(input.is_complete());
    }

    #[test]
    fn test_set_out_of_range() {
        let mut input = RawFeatureInput::empty();
        assert_eq!(
            input.set(30, "1"),
            Err(InputError::IndexOutOfRange { index: 30 })
        );
        assert!(!input.is_complete());
    }

    #[test]
    fn test_from_fields_requires_thirty() {
        assert!(RawFeatureInput::from_fields(numbers(30)).is_ok());
        assert_eq!(
            RawFeatureInput::from_fields(numbers(2)),
            Err(InputError::CountMismatch { actual: 2 })
        );
    }
}
