//! Common utility functions for biofeedback-core
//!
//! This module provides reusable utilities across the system:
//! - Wall-clock time sources with a mockable provider
//! - Range and enum validation helpers
//! - Numeric conversion and rounding helpers
//!
//! Limits are taken from the config module constants.

pub mod time;
pub mod validation;
pub mod conversion;

// Re-export commonly used functions for convenience
pub use time::{
    format_iso8601,
    MockTimeProvider,
    SystemTimeProvider,
    TimeProvider,
};

pub use validation::{
    validate_range,
    validate_stream_frequency,
    ValidationError,
    ValidationResult,
};

pub use conversion::{
    bpm_to_rr_interval_ms,
    frequency_to_period_seconds,
    round_to,
    seconds_to_duration,
};
