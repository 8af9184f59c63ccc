// src/config/mod.rs
//! Configuration management for the biofeedback server

pub mod constants;
pub mod loader;

pub use constants::*;
pub use loader::{write_config, ConfigError, ConfigLoader};

use crate::acquisition::baseline_protocol::BaselineSettings;
use crate::hal::simulation::Scenario;
use crate::processing::StressWeights;
use crate::utils::conversion::frequency_to_period_seconds;
use crate::utils::validation::{
    validate_positive_millis, validate_range, validate_stream_frequency, validate_usize_range,
    ValidationError,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Complete system configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct SystemConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

/// Listener and streaming settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerSettings {
    #[serde(default = "defaults::host")]
    pub host: String,

    #[serde(default = "defaults::port")]
    pub port: u16,

    #[serde(default = "defaults::stream_frequency_hz")]
    pub stream_frequency_hz: f64,

    /// Upper bound for delivering one message to one subscriber
    #[serde(default = "defaults::send_timeout_ms")]
    pub send_timeout_ms: u64,

    /// Per-connection outbound message queue capacity
    #[serde(default = "defaults::outbound_queue_size")]
    pub outbound_queue_size: usize,
}

/// Physiological simulation settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SimulationSettings {
    #[serde(default)]
    pub initial_scenario: Scenario,

    /// Fixed seed for reproducible runs, entropy when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,

    #[serde(default = "defaults::hr_history_window")]
    pub hr_history_window: usize,

    #[serde(default)]
    pub stress_weights: StressWeights,

    #[serde(default)]
    pub baseline: BaselineSettings,
}

/// Session artifact persistence settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SessionSettings {
    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "defaults::file_prefix")]
    pub file_prefix: String,

    #[serde(default = "defaults::write_timeout_ms")]
    pub write_timeout_ms: u64,
}

/// Default value providers using constants
mod defaults {
    use crate::config::constants::*;
    use std::path::PathBuf;

    pub fn host() -> String { streaming::DEFAULT_HOST.to_string() }
    pub fn port() -> u16 { streaming::DEFAULT_PORT }
    pub fn stream_frequency_hz() -> f64 { streaming::DEFAULT_FREQUENCY_HZ }
    pub fn send_timeout_ms() -> u64 { streaming::DEFAULT_SEND_TIMEOUT_MS }
    pub fn outbound_queue_size() -> usize { streaming::DEFAULT_OUTBOUND_QUEUE_SIZE }

    pub fn hr_history_window() -> usize { hrv::DEFAULT_HISTORY_WINDOW }

    pub fn output_dir() -> PathBuf { PathBuf::from(session::DEFAULT_OUTPUT_DIR) }
    pub fn file_prefix() -> String { session::DEFAULT_FILE_PREFIX.to_string() }
    pub fn write_timeout_ms() -> u64 { session::DEFAULT_WRITE_TIMEOUT_MS }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
            stream_frequency_hz: defaults::stream_frequency_hz(),
            send_timeout_ms: defaults::send_timeout_ms(),
            outbound_queue_size: defaults::outbound_queue_size(),
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            initial_scenario: Scenario::default(),
            rng_seed: None,
            hr_history_window: defaults::hr_history_window(),
            stress_weights: StressWeights::default(),
            baseline: BaselineSettings::default(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
            file_prefix: defaults::file_prefix(),
            write_timeout_ms: defaults::write_timeout_ms(),
        }
    }
}

impl ServerSettings {
    /// `host:port` string handed to the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn stream_interval_seconds(&self) -> f64 {
        frequency_to_period_seconds(self.stream_frequency_hz)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

impl SessionSettings {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

impl SystemConfig {
    /// Validate ranges and cross-field consistency, collecting every failure
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.server.host.trim().is_empty() {
            errors.push(ValidationError::RequiredFieldMissing("server.host".to_string()));
        }
        if let Err(e) = validate_stream_frequency(self.server.stream_frequency_hz) {
            errors.push(e);
        }
        if let Err(e) = validate_positive_millis("server.send_timeout_ms", self.server.send_timeout_ms) {
            errors.push(e);
        }
        if let Err(e) = validate_usize_range(
            "server.outbound_queue_size",
            self.server.outbound_queue_size,
            streaming::MIN_OUTBOUND_QUEUE_SIZE,
            usize::MAX,
        ) {
            errors.push(e);
        }

        if let Err(e) = validate_usize_range(
            "simulation.hr_history_window",
            self.simulation.hr_history_window,
            hrv::MIN_HISTORY_WINDOW,
            hrv::MAX_HISTORY_WINDOW,
        ) {
            errors.push(e);
        }
        if let Err(e) = self.simulation.stress_weights.validate() {
            errors.push(e);
        }

        let baseline = &self.simulation.baseline;
        if let Err(e) = validate_range(
            "simulation.baseline.resting_period_seconds",
            baseline.resting_period_seconds,
            0.0,
            f64::MAX,
        ) {
            errors.push(e);
        }
        if let Err(e) = validate_range(
            "simulation.baseline.baseline_window_seconds",
            baseline.baseline_window_seconds,
            f64::MIN_POSITIVE,
            f64::MAX,
        ) {
            errors.push(e);
        }
        if let Err(e) = validate_usize_range(
            "simulation.baseline.min_samples",
            baseline.min_samples,
            1,
            usize::MAX,
        ) {
            errors.push(e);
        }

        if self.session.file_prefix.trim().is_empty() {
            errors.push(ValidationError::RequiredFieldMissing("session.file_prefix".to_string()));
        }
        if let Err(e) = validate_positive_millis("session.write_timeout_ms", self.session.write_timeout_ms) {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Short description for startup logging
    pub fn get_summary(&self) -> ConfigSummary {
        ConfigSummary {
            bind_address: self.server.bind_address(),
            stream_frequency_hz: self.server.stream_frequency_hz,
            initial_scenario: self.simulation.initial_scenario,
            seeded: self.simulation.rng_seed.is_some(),
            output_dir: self.session.output_dir.clone(),
        }
    }
}

/// Configuration summary for display/logging
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub bind_address: String,
    pub stream_frequency_hz: f64,
    pub initial_scenario: Scenario,
    pub seeded: bool,
    pub output_dir: PathBuf,
}
