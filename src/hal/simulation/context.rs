//! Per-server simulation state
//! Location: src/hal/simulation/context.rs
//!
//! All mutable simulation state (virtual clock, scenario, HR history, baseline
//! protocol and the random source) lives in one [`SimulationState`] behind a
//! [`SimulationContext`] handle. Each server owns its own context, so
//! independent instances never share state.

use super::clock::SimulationClock;
use super::hrv_tracker::HrHistory;
use super::scenario::Scenario;
use super::signal_generator::{generate_eda, generate_heart_rate};
use crate::acquisition::baseline_protocol::{BaselineProtocol, BaselineSettings, BaselineStatus};
use crate::config::SimulationSettings;
use parking_lot::{Mutex, MutexGuard};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Mutable simulation state
#[derive(Debug)]
pub struct SimulationState {
    pub clock: SimulationClock,
    pub scenario: Scenario,
    pub hr_history: HrHistory,
    pub baseline: BaselineProtocol,
    rng: StdRng,
}

impl SimulationState {
    pub fn new(
        scenario: Scenario,
        history_window: usize,
        baseline: BaselineSettings,
        rng: StdRng,
    ) -> Self {
        Self {
            clock: SimulationClock::new(),
            scenario,
            hr_history: HrHistory::new(history_window),
            baseline: BaselineProtocol::new(baseline),
            rng,
        }
    }

    /// Draw the next HR value and record it in the HRV history
    pub fn next_heart_rate(&mut self) -> f64 {
        let hr = generate_heart_rate(self.clock.now(), self.scenario, &mut self.rng);
        self.hr_history.push(hr);
        hr
    }

    /// Draw the next EDA value
    pub fn next_eda(&mut self) -> f64 {
        generate_eda(self.clock.now(), self.scenario, &mut self.rng)
    }

    /// Current HRV (SDNN) over the recorded HR history
    pub fn current_hrv(&self) -> f64 {
        self.hr_history.sdnn()
    }

    pub fn baseline_status(&self) -> BaselineStatus {
        self.baseline.status(self.clock.now())
    }

    /// Restart the baseline protocol, which also rewinds virtual time
    pub fn reset_baseline_protocol(&mut self) {
        self.baseline.reset(&mut self.clock);
    }
}

/// Cloneable handle to one simulation's state
#[derive(Debug, Clone)]
pub struct SimulationContext {
    inner: Arc<Mutex<SimulationState>>,
}

impl SimulationContext {
    pub fn new(settings: &SimulationSettings) -> Self {
        let rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(settings, rng)
    }

    /// Build a context around an explicit random source
    pub fn with_rng(settings: &SimulationSettings, rng: StdRng) -> Self {
        let state = SimulationState::new(
            settings.initial_scenario,
            settings.hr_history_window,
            settings.baseline,
            rng,
        );
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Context with default settings and a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(&SimulationSettings::default(), StdRng::seed_from_u64(seed))
    }

    /// Lock the state. Guards must not be held across `.await`.
    pub fn lock(&self) -> MutexGuard<'_, SimulationState> {
        self.inner.lock()
    }

    pub fn current_time(&self) -> f64 {
        self.lock().clock.now()
    }

    pub fn advance_time(&self, dt: f64) {
        self.lock().clock.advance(dt);
    }

    pub fn scenario(&self) -> Scenario {
        self.lock().scenario
    }

    pub fn set_scenario(&self, scenario: Scenario) {
        self.lock().scenario = scenario;
    }

    pub fn baseline_status(&self) -> BaselineStatus {
        self.lock().baseline_status()
    }

    pub fn reset_baseline_protocol(&self) {
        self.lock().reset_baseline_protocol();
    }
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::new(&SimulationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heart_rate_draws_fill_history() {
        let context = SimulationContext::seeded(1);
        {
            let mut state = context.lock();
            assert_eq!(state.current_hrv(), 50.0);
            for _ in 0..25 {
                state.next_heart_rate();
            }
            assert_eq!(state.hr_history.len(), 20);
            let hrv = state.current_hrv();
            assert!((10.0..=200.0).contains(&hrv));
        }
    }

    #[test]
    fn test_eda_draws_leave_history_alone() {
        let context = SimulationContext::seeded(2);
        let mut state = context.lock();
        state.next_eda();
        assert!(state.hr_history.is_empty());
    }

    #[test]
    fn test_seeded_contexts_are_reproducible() {
        let a = SimulationContext::seeded(99);
        let b = SimulationContext::seeded(99);
        let draws_a: Vec<f64> = (0..10).map(|_| a.lock().next_heart_rate()).collect();
        let draws_b: Vec<f64> = (0..10).map(|_| b.lock().next_heart_rate()).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn test_contexts_are_independent() {
        let a = SimulationContext::seeded(5);
        let b = SimulationContext::seeded(5);
        a.advance_time(10.0);
        a.set_scenario(Scenario::Recovery);
        assert_eq!(b.current_time(), 0.0);
        assert_eq!(b.scenario(), Scenario::Mixed);
    }

    #[test]
    fn test_reset_rewinds_clock() {
        let context = SimulationContext::seeded(3);
        context.advance_time(200.0);
        context.reset_baseline_protocol();
        assert_eq!(context.current_time(), 0.0);
        assert!(!context.baseline_status().baseline_computed);
    }

    #[test]
    fn test_clones_share_state() {
        let context = SimulationContext::seeded(4);
        let handle = context.clone();
        handle.set_scenario(Scenario::StressBuildup);
        assert_eq!(context.scenario(), Scenario::StressBuildup);
    }
}
