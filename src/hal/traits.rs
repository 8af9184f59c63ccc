// src/hal/traits.rs
//! Sensor capability trait
//!
//! The sample assembler only ever talks to a [`SensorConnector`]; whether the
//! values come from the built-in simulator or external hardware is decided
//! when the server is constructed.

use crate::hal::types::{ConnectorInfo, SensorReading};
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by sensor connectors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConnectorError {
    #[error("{0} connector is not connected")]
    NotConnected(String),

    #[error("Sensor read failed: {0}")]
    ReadFailed(String),

    #[error("Sensor close failed: {0}")]
    CloseFailed(String),
}

/// Capability every physiological data source must provide
#[async_trait]
pub trait SensorConnector: Send + Sync {
    /// Read the current HR, EDA and HRV values
    async fn read(&mut self) -> Result<SensorReading, ConnectorError>;

    /// Release the underlying resources. Reads fail afterwards.
    async fn close(&mut self) -> Result<(), ConnectorError>;

    /// Whether the connector can currently serve reads
    fn is_connected(&self) -> bool;

    /// Human readable description of the connector
    fn info(&self) -> ConnectorInfo {
        ConnectorInfo {
            kind: "SensorConnector".to_string(),
            connected: self.is_connected(),
            description: None,
            data_source: None,
        }
    }
}
