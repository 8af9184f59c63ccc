// src/server/state.rs
//! State shared by the broadcaster and every connection task

use crate::acquisition::SampleAssembler;
use crate::config::SystemConfig;
use crate::hal::simulation::SimulationContext;
use crate::hal::{SensorConnector, SimConnector};
use crate::server::registry::{SubscriberId, SubscriptionRegistry};
use crate::utils::conversion::{frequency_to_period_seconds, seconds_to_duration};
use crate::utils::time::TimeProvider;
use crate::utils::validation::{validate_stream_frequency, ValidationResult};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runtime-mutable streaming cadence
#[derive(Debug)]
pub struct StreamSettings {
    frequency_hz: RwLock<f64>,
}

impl StreamSettings {
    pub fn new(frequency_hz: f64) -> ValidationResult<Self> {
        validate_stream_frequency(frequency_hz)?;
        Ok(Self {
            frequency_hz: RwLock::new(frequency_hz),
        })
    }

    pub fn frequency_hz(&self) -> f64 {
        *self.frequency_hz.read()
    }

    pub fn interval_seconds(&self) -> f64 {
        frequency_to_period_seconds(self.frequency_hz())
    }

    pub fn interval(&self) -> Duration {
        seconds_to_duration(self.interval_seconds())
    }

    /// Replace the frequency, returning the previous one. Out-of-range values change nothing.
    pub fn set_frequency_hz(&self, hz: f64) -> ValidationResult<f64> {
        validate_stream_frequency(hz)?;
        let mut current = self.frequency_hz.write();
        let old = *current;
        *current = hz;
        Ok(old)
    }
}

/// Everything a running server shares across tasks
pub struct ServerState {
    /// The single mutual-exclusion domain for ticks
    pub assembler: tokio::sync::Mutex<SampleAssembler>,
    pub registry: SubscriptionRegistry,
    pub stream: StreamSettings,
    pub context: SimulationContext,
    pub time_provider: Arc<dyn TimeProvider>,
    pub config: SystemConfig,
    running: AtomicBool,
    started_at: Mutex<Option<Instant>>,
    next_connection_id: AtomicU64,
    subscription_counter: AtomicU64,
}

impl ServerState {
    /// State around the built-in simulator connector
    pub fn with_simulator(
        config: SystemConfig,
        time_provider: Arc<dyn TimeProvider>,
    ) -> ValidationResult<Self> {
        let context = SimulationContext::new(&config.simulation);
        let connector = Box::new(SimConnector::new(context.clone()));
        Self::with_connector(config, connector, context, time_provider)
    }

    /// State around any sensor connector. `context` supplies clock, scenario
    /// and baseline protocol whatever the connector is.
    pub fn with_connector(
        config: SystemConfig,
        connector: Box<dyn SensorConnector>,
        context: SimulationContext,
        time_provider: Arc<dyn TimeProvider>,
    ) -> ValidationResult<Self> {
        let stream = StreamSettings::new(config.server.stream_frequency_hz)?;
        let assembler = SampleAssembler::new(
            connector,
            context.clone(),
            config.simulation.stress_weights,
            Arc::clone(&time_provider),
        );
        Ok(Self {
            assembler: tokio::sync::Mutex::new(assembler),
            registry: SubscriptionRegistry::new(),
            stream,
            context,
            time_provider,
            config,
            running: AtomicBool::new(false),
            started_at: Mutex::new(None),
            next_connection_id: AtomicU64::new(1),
            subscription_counter: AtomicU64::new(0),
        })
    }

    pub fn mark_running(&self) {
        *self.started_at.lock() = Some(Instant::now());
        self.running.store(true, Ordering::Release);
    }

    pub fn mark_stopped(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Seconds since [`mark_running`](Self::mark_running), zero before that
    pub fn uptime_seconds(&self) -> f64 {
        self.started_at
            .lock()
            .map(|started| started.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    pub fn next_connection_id(&self) -> SubscriberId {
        self.next_connection_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Monotonic counter reported as `client_id` on every subscribe
    pub fn next_client_id(&self) -> u64 {
        self.subscription_counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn send_timeout(&self) -> Duration {
        self.config.server.send_timeout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_settings_update() {
        let stream = StreamSettings::new(10.0).unwrap();
        assert_eq!(stream.set_frequency_hz(1.0), Ok(10.0));
        assert_eq!(stream.frequency_hz(), 1.0);
        assert_eq!(stream.interval_seconds(), 1.0);
        assert_eq!(stream.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_client_ids_are_monotonic() {
        let state = ServerState::with_simulator(
            SystemConfig::default(),
            Arc::new(crate::utils::time::SystemTimeProvider),
        )
        .unwrap();
        assert_eq!(state.next_client_id(), 1);
        assert_eq!(state.next_client_id(), 2);
        assert_ne!(state.next_connection_id(), state.next_connection_id());
        assert!(!state.is_running());
        assert_eq!(state.uptime_seconds(), 0.0);
    }

    #[test]
    fn test_stream_settings_reject_out_of_range() {
        let stream = StreamSettings::new(10.0).unwrap();
        assert!(stream.set_frequency_hz(75.0).is_err());
        assert!(stream.set_frequency_hz(0.05).is_err());
        assert!(stream.set_frequency_hz(f64::NAN).is_err());
        assert_eq!(stream.frequency_hz(), 10.0);
        assert!(StreamSettings::new(0.0).is_err());
    }
}
