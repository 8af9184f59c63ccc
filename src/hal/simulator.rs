//! Simulated sensor connector
//!
//! Serves HR, EDA and HRV from the shared [`SimulationContext`]. One `read`
//! takes the state lock once, so the three values always come from the same
//! virtual instant and scenario.

use crate::hal::simulation::SimulationContext;
use crate::hal::traits::{ConnectorError, SensorConnector};
use crate::hal::types::{ConnectorInfo, SensorReading};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

const CONNECTOR_NAME: &str = "SimConnector";

/// Built-in simulator implementation of [`SensorConnector`]
#[derive(Debug)]
pub struct SimConnector {
    context: SimulationContext,
    connected: AtomicBool,
    reads: AtomicU64,
}

impl SimConnector {
    pub fn new(context: SimulationContext) -> Self {
        Self {
            context,
            connected: AtomicBool::new(true),
            reads: AtomicU64::new(0),
        }
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    /// Number of successful reads served
    pub fn reads_served(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SensorConnector for SimConnector {
    async fn read(&mut self) -> Result<SensorReading, ConnectorError> {
        if !self.connected.load(Ordering::Acquire) {
            return Err(ConnectorError::NotConnected(CONNECTOR_NAME.to_string()));
        }

        let reading = {
            let mut state = self.context.lock();
            let hr = state.next_heart_rate();
            let eda = state.next_eda();
            let hrv = state.current_hrv();
            SensorReading { hr, eda, hrv }
        };

        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(reading)
    }

    async fn close(&mut self) -> Result<(), ConnectorError> {
        if self.connected.swap(false, Ordering::AcqRel) {
            debug!(reads = self.reads_served(), "Simulator connector closed");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn info(&self) -> ConnectorInfo {
        ConnectorInfo {
            kind: CONNECTOR_NAME.to_string(),
            connected: self.is_connected(),
            description: Some("Biofeedback simulation on a virtual clock".to_string()),
            data_source: Some(
                "Scenario-driven synthetic signals with physiological bounds".to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::simulation::Scenario;

    #[tokio::test]
    async fn test_read_produces_bounded_values() {
        let mut connector = SimConnector::new(SimulationContext::seeded(11));
        for _ in 0..50 {
            let reading = connector.read().await.unwrap();
            assert!((50.0..=180.0).contains(&reading.hr));
            assert!((0.1..=10.0).contains(&reading.eda));
            assert!((10.0..=200.0).contains(&reading.hrv) || reading.hrv == 50.0);
        }
        assert_eq!(connector.reads_served(), 50);
    }

    #[tokio::test]
    async fn test_first_read_uses_default_hrv() {
        let mut connector = SimConnector::new(SimulationContext::seeded(12));
        // Only one HR value exists when HRV is computed on the first read
        let reading = connector.read().await.unwrap();
        assert_eq!(reading.hrv, 50.0);
    }

    #[tokio::test]
    async fn test_read_does_not_advance_clock() {
        let context = SimulationContext::seeded(13);
        let mut connector = SimConnector::new(context.clone());
        connector.read().await.unwrap();
        connector.read().await.unwrap();
        assert_eq!(context.current_time(), 0.0);
        assert_eq!(context.lock().hr_history.len(), 2);
    }

    #[tokio::test]
    async fn test_close_blocks_reads() {
        let mut connector = SimConnector::new(SimulationContext::seeded(14));
        assert!(connector.is_connected());

        connector.close().await.unwrap();
        assert!(!connector.is_connected());
        assert!(matches!(connector.read().await, Err(ConnectorError::NotConnected(_))));

        // Closing twice is harmless
        connector.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_info_reflects_state() {
        let mut connector = SimConnector::new(SimulationContext::seeded(15));
        let info = connector.info();
        assert_eq!(info.kind, "SimConnector");
        assert!(info.connected);

        connector.close().await.unwrap();
        assert!(!connector.info().connected);
    }

    #[tokio::test]
    async fn test_follows_context_scenario() {
        let context = SimulationContext::seeded(16);
        context.set_scenario(Scenario::StressBuildup);
        context.advance_time(600.0);

        let mut connector = SimConnector::new(context);
        let mut total = 0.0;
        for _ in 0..20 {
            total += connector.read().await.unwrap().hr;
        }
        // Saturated stress buildup centres around 95 BPM
        assert!(total / 20.0 > 85.0);
    }
}
