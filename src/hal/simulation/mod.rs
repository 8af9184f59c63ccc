//! Physiological simulation for the built-in sensor connector
//! Location: src/hal/simulation/mod.rs

pub mod clock;
pub mod scenario;
pub mod signal_generator;
pub mod hrv_tracker;
pub mod context;

pub use clock::SimulationClock;
pub use scenario::Scenario;
pub use signal_generator::{eda_shape, generate_eda, generate_heart_rate, heart_rate_shape, SignalShape};
pub use hrv_tracker::HrHistory;
pub use context::{SimulationContext, SimulationState};
