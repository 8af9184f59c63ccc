//! biofeedback-core: physiological signal simulation and real-time streaming
//!
//! This library simulates heart rate, electrodermal activity, heart-rate
//! variability and a composite stress index on a virtual clock, and streams
//! them to WebSocket subscribers. It features:
//!
//! - Scenario-driven signal generation with physiological bounds
//! - A baseline acquisition protocol gating calibration
//! - A sensor capability trait with a built-in simulator
//! - Concurrent fan-out where one slow client never stalls the rest
//! - Layered configuration (defaults, TOML, environment)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use biofeedback_core::config::SystemConfig;
//! use biofeedback_core::server::BiofeedbackServer;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = BiofeedbackServer::bind(SystemConfig::default()).await?;
//!     let shutdown = CancellationToken::new();
//!
//!     let trigger = shutdown.clone();
//!     tokio::spawn(async move {
//!         let _ = tokio::signal::ctrl_c().await;
//!         trigger.cancel();
//!     });
//!
//!     server.serve(shutdown).await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod acquisition;
pub mod config;
pub mod error;
pub mod hal;
pub mod processing;
pub mod server;
pub mod utils;

// Re-export commonly used types for convenience
pub use acquisition::{BaselineStatus, Sample, SampleAssembler};
pub use config::SystemConfig;
pub use error::{BiofeedbackError, BiofeedbackResult};
pub use hal::simulation::{Scenario, SimulationContext};
pub use hal::{ConnectorError, SensorConnector, SensorReading, SimConnector};
pub use processing::{compute_stress_index, StressWeights};
pub use server::{BiofeedbackServer, Response};

pub use utils::{
    time::TimeProvider,
    validation::{ValidationError, ValidationResult},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Physiological signal simulation and real-time biofeedback streaming".to_string(),
        features: vec![
            "Scenario-driven HR and EDA simulation".to_string(),
            "HRV and stress index metrics".to_string(),
            "Baseline acquisition protocol".to_string(),
            "WebSocket streaming server".to_string(),
        ],
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert_eq!(info.name, NAME);
        assert_eq!(info.version, VERSION);
        assert!(!info.features.is_empty());
    }
}
