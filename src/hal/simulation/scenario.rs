//! Physiological scenarios driving the signal generator
//! Location: src/hal/simulation/scenario.rs

use crate::utils::validation::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named physiological trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Calm resting state
    Baseline,
    /// Arousal ramping up from rest
    StressBuildup,
    /// Return from an aroused state towards rest
    Recovery,
    /// Calm, then stress, then recovery
    Mixed,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Baseline,
        Scenario::StressBuildup,
        Scenario::Recovery,
        Scenario::Mixed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Baseline => "baseline",
            Scenario::StressBuildup => "stress_buildup",
            Scenario::Recovery => "recovery",
            Scenario::Mixed => "mixed",
        }
    }

    /// Wire names of every scenario, in declaration order
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Scenario::as_str).collect()
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario::Mixed
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|scenario| scenario.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidEnumValue {
                field: "scenario".to_string(),
                value: s.to_string(),
                valid_values: Self::names().into_iter().map(String::from).collect(),
            })
    }
}
