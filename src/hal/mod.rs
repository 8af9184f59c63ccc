// src/hal/mod.rs
//! Sensor abstraction layer for physiological data sources

pub mod traits;
pub mod types;
pub mod simulator;
pub mod simulation;


pub use traits::*;
pub use types::*;
pub use simulator::SimConnector;
