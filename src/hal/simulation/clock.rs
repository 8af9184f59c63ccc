//! Virtual simulation clock
//! Location: src/hal/simulation/clock.rs

use serde::Serialize;

/// Virtual time in seconds, advanced only by explicit deltas.
///
/// The clock never reads the wall clock; it moves forward exactly by what the
/// caller asks for, so a tick at 10 Hz advances it by 0.1 s regardless of how
/// long the tick actually took.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SimulationClock {
    time: f64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in seconds
    #[inline]
    pub fn now(&self) -> f64 {
        self.time
    }

    /// Advance by `dt` seconds. Negative or non-finite deltas are ignored so
    /// the clock stays monotonic.
    pub fn advance(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.time += dt;
        }
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }
}
