//! Validation utilities for biofeedback-core
//!
//! Provides validation helpers for:
//! - Numeric ranges (stream frequency, weights, timeouts)
//! - Enumerated string values (scenario names)
//! - Required fields in decoded requests
//!
//! Range limits come from the config module constants.

use crate::config::constants::streaming;
use thiserror::Error;

/// Validation result type
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of valid range
    #[error("Field '{field}' value '{value}' is out of range [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: String,
        min: String,
        max: String,
    },

    /// Required field missing
    #[error("Required field '{0}' is missing")]
    RequiredFieldMissing(String),

    /// Invalid field format
    #[error("Field '{field}' has invalid format '{value}', expected {expected}")]
    InvalidFormat {
        field: String,
        value: String,
        expected: String,
    },

    /// Invalid enum value
    #[error("Field '{field}' value '{value}' is invalid, valid values: [{}]", .valid_values.join(", "))]
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },

    /// Cross-field validation failure
    #[error("Constraint violation for fields [{}]: {message}", .fields.join(", "))]
    ConstraintViolation {
        fields: Vec<String>,
        message: String,
    },
}

/// Validate that a floating point value is finite and inside `[min, max]`
pub fn validate_range(field: &str, value: f64, min: f64, max: f64) -> ValidationResult<f64> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(value)
}

/// Validate an unsigned integer lies inside `[min, max]`
pub fn validate_usize_range(field: &str, value: usize, min: usize, max: usize) -> ValidationResult<usize> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(value)
}

/// Validate a streaming frequency against the supported range
pub fn validate_stream_frequency(hz: f64) -> ValidationResult<f64> {
    validate_range(
        "stream_frequency_hz",
        hz,
        streaming::MIN_FREQUENCY_HZ,
        streaming::MAX_FREQUENCY_HZ,
    )
}

/// Validate a duration given in milliseconds is non-zero
pub fn validate_positive_millis(field: &str, millis: u64) -> ValidationResult<u64> {
    if millis == 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: millis.to_string(),
            min: "1".to_string(),
            max: u64::MAX.to_string(),
        });
    }
    Ok(millis)
}
