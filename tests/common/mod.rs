// tests/common/mod.rs
//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use biofeedback_core::config::SystemConfig;
use biofeedback_core::hal::{ConnectorError, SensorConnector, SensorReading};
use biofeedback_core::server::{Caller, DeliveryError, MessageSink, ServerState};
use biofeedback_core::utils::time::MockTimeProvider;
use biofeedback_core::SimulationContext;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// 2025-08-01T12:00:00Z
pub const MOCK_EPOCH_SECONDS: i64 = 1_754_049_600;

pub fn test_config() -> SystemConfig {
    let mut config = SystemConfig::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.server.send_timeout_ms = 200;
    config.simulation.rng_seed = Some(42);
    config
}

pub fn mock_time() -> Arc<MockTimeProvider> {
    Arc::new(MockTimeProvider::from_unix_seconds(MOCK_EPOCH_SECONDS))
}

/// Server state around the simulator with a pinned wall clock
pub fn simulator_state(config: SystemConfig) -> Arc<ServerState> {
    Arc::new(ServerState::with_simulator(config, mock_time()).expect("valid config"))
}

/// Connector that always reports the same values
pub struct FixedConnector {
    pub reading: SensorReading,
}

#[async_trait]
impl SensorConnector for FixedConnector {
    async fn read(&mut self) -> Result<SensorReading, ConnectorError> {
        Ok(self.reading)
    }

    async fn close(&mut self) -> Result<(), ConnectorError> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }
}

/// Server state whose connector always reads 75 BPM, 2.0 µS, 50 ms
pub fn resting_state(config: SystemConfig) -> (Arc<ServerState>, SimulationContext) {
    let context = SimulationContext::new(&config.simulation);
    let connector = Box::new(FixedConnector {
        reading: SensorReading { hr: 75.0, eda: 2.0, hrv: 50.0 },
    });
    let state = ServerState::with_connector(config, connector, context.clone(), mock_time())
        .expect("valid config");
    (Arc::new(state), context)
}

/// Sink that records every frame
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<Arc<str>>>,
    closed: Mutex<bool>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<Arc<str>> {
        self.messages.lock().clone()
    }

    pub fn last_json(&self) -> serde_json::Value {
        let messages = self.messages.lock();
        let last = messages.last().expect("at least one message");
        serde_json::from_str(last).expect("valid JSON")
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send(&self, message: Arc<str>) -> Result<(), DeliveryError> {
        self.messages.lock().push(message);
        Ok(())
    }

    async fn close(&self) -> Result<(), DeliveryError> {
        *self.closed.lock() = true;
        Ok(())
    }
}

/// Sink whose connection is gone
pub struct FailingSink;

#[async_trait]
impl MessageSink for FailingSink {
    async fn send(&self, _message: Arc<str>) -> Result<(), DeliveryError> {
        Err(DeliveryError::Closed)
    }
}

/// Sink that never completes a send
pub struct StalledSink;

#[async_trait]
impl MessageSink for StalledSink {
    async fn send(&self, _message: Arc<str>) -> Result<(), DeliveryError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

pub fn recording_caller(id: u64) -> (Caller, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let caller = Caller {
        id,
        sink: sink.clone(),
    };
    (caller, sink)
}
