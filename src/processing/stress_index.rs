// src/processing/stress_index.rs
//! Composite stress index from HR, EDA and HRV

use crate::config::constants::stress::*;
use crate::utils::validation::{validate_range, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};

/// Relative contribution of each normalized signal to the stress index
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct StressWeights {
    #[serde(default = "defaults::hr")]
    pub hr: f64,

    #[serde(default = "defaults::eda")]
    pub eda: f64,

    #[serde(default = "defaults::hrv")]
    pub hrv: f64,
}

mod defaults {
    use crate::config::constants::stress::*;

    pub fn hr() -> f64 { DEFAULT_HR_WEIGHT }
    pub fn eda() -> f64 { DEFAULT_EDA_WEIGHT }
    pub fn hrv() -> f64 { DEFAULT_HRV_WEIGHT }
}

impl Default for StressWeights {
    fn default() -> Self {
        Self {
            hr: DEFAULT_HR_WEIGHT,
            eda: DEFAULT_EDA_WEIGHT,
            hrv: DEFAULT_HRV_WEIGHT,
        }
    }
}

impl StressWeights {
    /// Weights are applied as given; only negative or non-finite values are rejected
    pub fn validate(&self) -> ValidationResult<()> {
        for (field, value) in [
            ("simulation.stress_weights.hr", self.hr),
            ("simulation.stress_weights.eda", self.eda),
            ("simulation.stress_weights.hrv", self.hrv),
        ] {
            validate_range(field, value, 0.0, f64::MAX)?;
        }

        if self.hr + self.eda + self.hrv <= 0.0 {
            return Err(ValidationError::ConstraintViolation {
                fields: vec![
                    "simulation.stress_weights.hr".to_string(),
                    "simulation.stress_weights.eda".to_string(),
                    "simulation.stress_weights.hrv".to_string(),
                ],
                message: "at least one weight must be positive".to_string(),
            });
        }

        Ok(())
    }
}

/// Each input mapped onto [0, 1], where 1 means most stressed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedSignals {
    pub hr: f64,
    pub eda: f64,
    pub hrv: f64,
}

impl NormalizedSignals {
    pub fn from_raw(hr: f64, eda: f64, hrv: f64) -> Self {
        Self {
            hr: ((hr - HR_FLOOR_BPM) / (HR_CEILING_BPM - HR_FLOOR_BPM)).clamp(0.0, 1.0),
            eda: (eda / EDA_CEILING_MICROSIEMENS).clamp(0.0, 1.0),
            // Low variability indicates stress, so HRV is inverted
            hrv: (1.0 - (hrv - HRV_FLOOR_MS) / (HRV_CEILING_MS - HRV_FLOOR_MS)).clamp(0.0, 1.0),
        }
    }
}

/// Weighted stress index on a 0-100 scale.
///
/// The weighted sum is not renormalized, so weights summing above 1.0 can
/// push the result past 100.
pub fn compute_stress_index(hr: f64, eda: f64, hrv: f64, weights: &StressWeights) -> f64 {
    let norm = NormalizedSignals::from_raw(hr, eda, hrv);
    INDEX_SCALE * (weights.hr * norm.hr + weights.eda * norm.eda + weights.hrv * norm.hrv)
}
