// src/acquisition/baseline_protocol.rs
//! Baseline acquisition protocol
//!
//! A run starts with a resting period (default 180 s of virtual time) followed
//! by a baseline window (default 60 s). Samples produced inside the window are
//! collected until at least `min_samples` are held, at which point the resting
//! HR/EDA/HRV averages can be computed. The protocol is complete only once the
//! window has elapsed *and* the baseline was computed; a run that leaves the
//! window without enough samples stays [`BaselinePhase::Stalled`].

use crate::config::constants::{baseline, physiology};
use crate::hal::simulation::SimulationClock;
use serde::{Deserialize, Serialize};

/// Timing parameters of one protocol run
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct BaselineSettings {
    #[serde(default = "defaults::resting_period_seconds")]
    pub resting_period_seconds: f64,

    #[serde(default = "defaults::baseline_window_seconds")]
    pub baseline_window_seconds: f64,

    #[serde(default = "defaults::min_samples")]
    pub min_samples: usize,
}

mod defaults {
    use crate::config::constants::baseline::*;

    pub fn resting_period_seconds() -> f64 { DEFAULT_RESTING_PERIOD_SECONDS }
    pub fn baseline_window_seconds() -> f64 { DEFAULT_BASELINE_WINDOW_SECONDS }
    pub fn min_samples() -> usize { DEFAULT_MIN_SAMPLES }
}

impl Default for BaselineSettings {
    fn default() -> Self {
        Self {
            resting_period_seconds: baseline::DEFAULT_RESTING_PERIOD_SECONDS,
            baseline_window_seconds: baseline::DEFAULT_BASELINE_WINDOW_SECONDS,
            min_samples: baseline::DEFAULT_MIN_SAMPLES,
        }
    }
}

/// One sample captured inside the baseline window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaselineSample {
    pub time: f64,
    pub hr: f64,
    pub eda: f64,
    pub hrv: f64,
}

/// Protocol state as a function of virtual time and computation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselinePhase {
    Resting,
    BaselineWindow,
    BaselineWindowComputed,
    Complete,
    /// Window elapsed without a computed baseline
    Stalled,
}

/// Point-in-time view of the protocol, as reported by `status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineStatus {
    pub current_time: f64,
    pub phase: BaselinePhase,
    pub resting_period_seconds: f64,
    pub baseline_window_seconds: f64,
    pub in_resting_period: bool,
    pub in_baseline_window: bool,
    pub baseline_computed: bool,
    pub baseline_samples_collected: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_hr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_eda: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_hrv: Option<f64>,
}

/// Baseline protocol state machine
#[derive(Debug, Clone)]
pub struct BaselineProtocol {
    settings: BaselineSettings,
    samples: Vec<BaselineSample>,
    computed: bool,
    baseline_hr: f64,
    baseline_eda: f64,
    baseline_hrv: f64,
}

impl BaselineProtocol {
    pub fn new(settings: BaselineSettings) -> Self {
        Self {
            settings,
            samples: Vec::new(),
            computed: false,
            baseline_hr: physiology::RESTING_HR_BPM,
            baseline_eda: physiology::RESTING_EDA_MICROSIEMENS,
            baseline_hrv: physiology::RESTING_HRV_MS,
        }
    }

    pub fn settings(&self) -> &BaselineSettings {
        &self.settings
    }

    fn window_start(&self) -> f64 {
        self.settings.resting_period_seconds
    }

    fn window_end(&self) -> f64 {
        self.settings.resting_period_seconds + self.settings.baseline_window_seconds
    }

    pub fn is_in_resting_period(&self, t: f64) -> bool {
        t < self.window_start()
    }

    pub fn is_in_baseline_window(&self, t: f64) -> bool {
        self.window_start() <= t && t < self.window_end()
    }

    pub fn phase(&self, t: f64) -> BaselinePhase {
        if self.is_in_resting_period(t) {
            BaselinePhase::Resting
        } else if self.is_in_baseline_window(t) {
            if self.computed {
                BaselinePhase::BaselineWindowComputed
            } else {
                BaselinePhase::BaselineWindow
            }
        } else if self.computed {
            BaselinePhase::Complete
        } else {
            BaselinePhase::Stalled
        }
    }

    /// Whether a sample produced at `t` belongs to the baseline set
    pub fn should_collect(&self, t: f64) -> bool {
        self.is_in_baseline_window(t) && !self.computed
    }

    /// Append a sample captured at virtual time `t`
    pub fn collect(&mut self, t: f64, hr: f64, eda: f64, hrv: f64) {
        self.samples.push(BaselineSample { time: t, hr, eda, hrv });
    }

    /// Compute the baseline averages.
    ///
    /// Returns `false` without touching state when fewer than `min_samples`
    /// are held. Once computed, further calls return `true` and change nothing.
    pub fn compute(&mut self) -> bool {
        if self.computed {
            return true;
        }
        if self.samples.len() < self.settings.min_samples || self.samples.is_empty() {
            return false;
        }

        let n = self.samples.len() as f64;
        self.baseline_hr = self.samples.iter().map(|s| s.hr).sum::<f64>() / n;
        self.baseline_eda = self.samples.iter().map(|s| s.eda).sum::<f64>() / n;
        self.baseline_hrv = self.samples.iter().map(|s| s.hrv).sum::<f64>() / n;
        self.computed = true;
        true
    }

    pub fn has_enough_samples(&self) -> bool {
        self.samples.len() >= self.settings.min_samples
    }

    pub fn is_computed(&self) -> bool {
        self.computed
    }

    pub fn is_complete(&self, t: f64) -> bool {
        t >= self.window_end() && self.computed
    }

    pub fn samples(&self) -> &[BaselineSample] {
        &self.samples
    }

    pub fn baseline_hr(&self) -> f64 {
        self.baseline_hr
    }

    pub fn baseline_eda(&self) -> f64 {
        self.baseline_eda
    }

    pub fn baseline_hrv(&self) -> f64 {
        self.baseline_hrv
    }

    pub fn status(&self, t: f64) -> BaselineStatus {
        let computed = self.computed;
        BaselineStatus {
            current_time: t,
            phase: self.phase(t),
            resting_period_seconds: self.settings.resting_period_seconds,
            baseline_window_seconds: self.settings.baseline_window_seconds,
            in_resting_period: self.is_in_resting_period(t),
            in_baseline_window: self.is_in_baseline_window(t),
            baseline_computed: computed,
            baseline_samples_collected: self.samples.len(),
            baseline_hr: computed.then_some(self.baseline_hr),
            baseline_eda: computed.then_some(self.baseline_eda),
            baseline_hrv: computed.then_some(self.baseline_hrv),
        }
    }

    /// Restart the protocol from scratch, including virtual time
    pub fn reset(&mut self, clock: &mut SimulationClock) {
        self.samples.clear();
        self.computed = false;
        self.baseline_hr = physiology::RESTING_HR_BPM;
        self.baseline_eda = physiology::RESTING_EDA_MICROSIEMENS;
        self.baseline_hrv = physiology::RESTING_HRV_MS;
        clock.reset();
    }
}

impl Default for BaselineProtocol {
    fn default() -> Self {
        Self::new(BaselineSettings::default())
    }
}
