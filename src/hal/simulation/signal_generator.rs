//! Scenario-driven HR and EDA signal generation
//! Location: src/hal/simulation/signal_generator.rs
//!
//! Each scenario is a piecewise trajectory over virtual time. A phase is
//! described by a [`SignalShape`]: a base level, two sinusoidal components
//! (slow and fast/medium) and a gaussian noise level. Outputs are clamped to
//! physiological bounds.

use super::scenario::Scenario;
use crate::config::constants::physiology::{
    EDA_MAX_MICROSIEMENS, EDA_MIN_MICROSIEMENS, HR_MAX_BPM, HR_MIN_BPM, RESTING_EDA_MICROSIEMENS,
    RESTING_HR_BPM,
};
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::PI;

/// Sinusoidal component `amplitude * sin(2πt / period)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oscillation {
    pub amplitude: f64,
    pub period_seconds: f64,
}

impl Oscillation {
    const fn new(amplitude: f64, period_seconds: f64) -> Self {
        Self { amplitude, period_seconds }
    }

    #[inline]
    pub fn at(&self, t: f64) -> f64 {
        self.amplitude * (2.0 * PI * t / self.period_seconds).sin()
    }
}

/// Signal parameters for one scenario phase at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalShape {
    pub base: f64,
    pub slow: Oscillation,
    pub fast: Oscillation,
    pub noise_std_dev: f64,
}

impl SignalShape {
    /// Noise-free part of the signal
    pub fn deterministic(&self, t: f64) -> f64 {
        self.base + self.slow.at(t) + self.fast.at(t)
    }

    /// Signal with one gaussian noise draw from `rng`
    pub fn sample<R: Rng>(&self, t: f64, rng: &mut R) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        self.deterministic(t) + z * self.noise_std_dev
    }
}

#[inline]
fn unit(factor: f64) -> f64 {
    factor.clamp(0.0, 1.0)
}

/// Heart-rate shape for `scenario` at virtual time `t`
pub fn heart_rate_shape(t: f64, scenario: Scenario) -> SignalShape {
    let rest = RESTING_HR_BPM;
    match scenario {
        Scenario::Baseline => calm_heart_rate(rest),
        Scenario::StressBuildup => {
            let stress_factor = unit(t / 30.0);
            SignalShape {
                base: rest + stress_factor * 20.0,
                slow: Oscillation::new(2.0, 30.0),
                fast: Oscillation::new(3.0, 8.0),
                noise_std_dev: 2.0 + stress_factor,
            }
        }
        Scenario::Recovery => {
            if t < 10.0 {
                let stress_factor = unit(1.0 - t / 10.0);
                SignalShape {
                    base: rest + stress_factor * 15.0,
                    slow: Oscillation::new(3.0, 25.0),
                    fast: Oscillation::new(2.0, 10.0),
                    noise_std_dev: 2.0,
                }
            } else {
                SignalShape {
                    base: rest,
                    slow: Oscillation::new(2.0, 40.0),
                    fast: Oscillation::new(1.5, 12.0),
                    noise_std_dev: 1.2,
                }
            }
        }
        Scenario::Mixed => {
            if t < 20.0 {
                calm_heart_rate(rest)
            } else if t < 40.0 {
                let stress_factor = unit((t - 20.0) / 20.0);
                SignalShape {
                    base: rest + stress_factor * 25.0,
                    slow: Oscillation::new(4.0, 20.0),
                    fast: Oscillation::new(3.0, 6.0),
                    noise_std_dev: 2.5 + stress_factor,
                }
            } else {
                let recovery_factor = unit((t - 40.0) / 20.0);
                SignalShape {
                    base: rest + (1.0 - recovery_factor) * 20.0,
                    slow: Oscillation::new(2.0, 35.0),
                    fast: Oscillation::new(2.0, 12.0),
                    noise_std_dev: 1.8,
                }
            }
        }
    }
}

fn calm_heart_rate(rest: f64) -> SignalShape {
    SignalShape {
        base: rest,
        slow: Oscillation::new(3.0, 45.0),
        fast: Oscillation::new(2.0, 12.0),
        noise_std_dev: 1.5,
    }
}

/// Electrodermal-activity shape for `scenario` at virtual time `t`.
///
/// EDA responds more slowly than HR, so ramps and recoveries are longer.
pub fn eda_shape(t: f64, scenario: Scenario) -> SignalShape {
    let rest = RESTING_EDA_MICROSIEMENS;
    match scenario {
        Scenario::Baseline => calm_eda(rest),
        Scenario::StressBuildup => {
            let stress_factor = unit(t / 45.0);
            SignalShape {
                base: rest + stress_factor * 2.0,
                slow: Oscillation::new(0.4, 40.0),
                fast: Oscillation::new(0.3, 15.0),
                noise_std_dev: 0.15 + stress_factor * 0.1,
            }
        }
        Scenario::Recovery => {
            if t < 20.0 {
                let stress_factor = unit(1.0 - t / 20.0);
                SignalShape {
                    base: rest + stress_factor * 1.8,
                    slow: Oscillation::new(0.4, 35.0),
                    fast: Oscillation::new(0.25, 18.0),
                    noise_std_dev: 0.12,
                }
            } else {
                SignalShape {
                    base: rest,
                    slow: Oscillation::new(0.25, 55.0),
                    fast: Oscillation::new(0.15, 28.0),
                    noise_std_dev: 0.08,
                }
            }
        }
        Scenario::Mixed => {
            if t < 20.0 {
                calm_eda(rest)
            } else if t < 40.0 {
                // Ramp is stretched over 30 s, so the stress phase ends before
                // the full +2.5 µS offset is reached.
                let stress_factor = unit((t - 20.0) / 30.0);
                SignalShape {
                    base: rest + stress_factor * 2.5,
                    slow: Oscillation::new(0.5, 30.0),
                    fast: Oscillation::new(0.4, 12.0),
                    noise_std_dev: 0.2 + stress_factor * 0.1,
                }
            } else {
                let recovery_factor = unit((t - 40.0) / 30.0);
                SignalShape {
                    base: rest + (1.0 - recovery_factor) * 2.2,
                    slow: Oscillation::new(0.35, 45.0),
                    fast: Oscillation::new(0.25, 20.0),
                    noise_std_dev: 0.12,
                }
            }
        }
    }
}

fn calm_eda(rest: f64) -> SignalShape {
    SignalShape {
        base: rest,
        slow: Oscillation::new(0.3, 60.0),
        fast: Oscillation::new(0.2, 25.0),
        noise_std_dev: 0.1,
    }
}

/// Draw one heart-rate value in BPM, clamped to `[50, 180]`
pub fn generate_heart_rate<R: Rng>(t: f64, scenario: Scenario, rng: &mut R) -> f64 {
    heart_rate_shape(t, scenario)
        .sample(t, rng)
        .clamp(HR_MIN_BPM, HR_MAX_BPM)
}

/// Draw one EDA value in µS, clamped to `[0.1, 10]`
pub fn generate_eda<R: Rng>(t: f64, scenario: Scenario, rng: &mut R) -> f64 {
    eda_shape(t, scenario)
        .sample(t, rng)
        .clamp(EDA_MIN_MICROSIEMENS, EDA_MAX_MICROSIEMENS)
}
