//! Numeric conversion helpers shared by the signal and wire layers

use crate::config::constants::physiology::MILLISECONDS_PER_MINUTE;
use std::time::Duration;

/// Round to a fixed number of decimal places (half away from zero)
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Convert a heart rate in BPM into the RR interval in milliseconds
#[inline]
pub fn bpm_to_rr_interval_ms(bpm: f64) -> f64 {
    MILLISECONDS_PER_MINUTE / bpm
}

/// Convert a frequency in Hz into its period in seconds
#[inline]
pub fn frequency_to_period_seconds(hz: f64) -> f64 {
    1.0 / hz
}

/// Convert a period in (possibly fractional) seconds into a `Duration`.
///
/// Non-finite or negative inputs map to `Duration::ZERO`.
pub fn seconds_to_duration(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(75.26, 1), 75.3);
        assert_eq!(round_to(2.12345, 3), 2.123);
        assert_eq!(round_to(-1.25, 0), -1.0);
    }

    #[test]
    fn test_rr_interval() {
        assert_eq!(bpm_to_rr_interval_ms(60.0), 1000.0);
        assert_eq!(bpm_to_rr_interval_ms(120.0), 500.0);
    }

    #[test]
    fn test_period_conversion() {
        assert_eq!(frequency_to_period_seconds(10.0), 0.1);
        assert_eq!(frequency_to_period_seconds(1.0), 1.0);
        assert_eq!(seconds_to_duration(0.5), Duration::from_millis(500));
        assert_eq!(seconds_to_duration(-1.0), Duration::ZERO);
        assert_eq!(seconds_to_duration(f64::NAN), Duration::ZERO);
    }
}
