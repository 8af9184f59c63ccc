//! Wall-clock time sources
//!
//! Sample timestamps are wall-clock while signal values follow virtual
//! simulation time. The wall clock is injected so tests can pin timestamps.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use parking_lot::Mutex;

/// Wall-clock provider trait for dependency injection and testing
pub trait TimeProvider: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// ISO-8601 UTC timestamp with microsecond precision and `+00:00` offset
    fn now_iso8601(&self) -> String {
        format_iso8601(&self.now())
    }
}

/// System time provider using the actual system clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock time provider for deterministic testing
#[derive(Debug)]
pub struct MockTimeProvider {
    current_time: Mutex<DateTime<Utc>>,
}

impl MockTimeProvider {
    pub fn new(initial: DateTime<Utc>) -> Self {
        Self {
            current_time: Mutex::new(initial),
        }
    }

    /// Mock pinned to the Unix epoch plus `secs`
    pub fn from_unix_seconds(secs: i64) -> Self {
        let initial = Utc.timestamp_opt(secs, 0).single().unwrap_or_default();
        Self::new(initial)
    }

    pub fn advance_by(&self, delta: chrono::Duration) {
        let mut current = self.current_time.lock();
        *current += delta;
    }

    pub fn set_time(&self, time: DateTime<Utc>) {
        *self.current_time.lock() = time;
    }
}

impl TimeProvider for MockTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        *self.current_time.lock()
    }
}

/// Format a timestamp the way samples carry it on the wire
pub fn format_iso8601(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, false)
}
