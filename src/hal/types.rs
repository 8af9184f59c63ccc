// src/hal/types.rs
//! Core types for sensor connector abstraction

use serde::{Deserialize, Serialize};

/// One reading from a physiological sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Heart rate in BPM
    pub hr: f64,
    /// Electrodermal activity in µS
    pub eda: f64,
    /// Heart-rate variability (SDNN) in ms
    pub hrv: f64,
}

/// Connector description reported in server status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
}
