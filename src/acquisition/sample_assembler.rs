// src/acquisition/sample_assembler.rs
//! Tick orchestration: one sensor read becomes one logged [`Sample`]
//!
//! A tick reads the connector, feeds the baseline protocol, computes the
//! stress index, stamps the sample with wall-clock time, advances the virtual
//! clock by the stream interval and appends to the session log. Callers must
//! serialize ticks; the server holds the assembler behind one async mutex.

use crate::acquisition::session_log::SessionLog;
use crate::hal::simulation::{Scenario, SimulationContext};
use crate::hal::{ConnectorError, ConnectorInfo, SensorConnector};
use crate::processing::{compute_stress_index, StressWeights};
use crate::utils::conversion::round_to;
use crate::utils::time::TimeProvider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// One biofeedback sample as sent to clients and logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Wall-clock ISO-8601 UTC time of generation
    pub timestamp: String,
    /// BPM, 1 decimal
    pub hr: f64,
    /// µS, 3 decimals
    pub eda: f64,
    /// ms, 1 decimal
    pub hrv: f64,
    /// 0-100, 1 decimal
    pub stress: f64,
    pub scenario: Scenario,
}

pub struct SampleAssembler {
    connector: Box<dyn SensorConnector>,
    context: SimulationContext,
    weights: StressWeights,
    session_log: SessionLog,
    time_provider: Arc<dyn TimeProvider>,
}

impl SampleAssembler {
    pub fn new(
        connector: Box<dyn SensorConnector>,
        context: SimulationContext,
        weights: StressWeights,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        let session_log = SessionLog::new(time_provider.now());
        Self {
            connector,
            context,
            weights,
            session_log,
            time_provider,
        }
    }

    /// Produce one sample and advance virtual time by `stream_interval` seconds.
    ///
    /// A failed sensor read returns the error before any state is touched.
    pub async fn tick(&mut self, stream_interval: f64) -> Result<Sample, ConnectorError> {
        let reading = self.connector.read().await?;

        let sample = {
            let mut state = self.context.lock();
            let t = state.clock.now();

            if state.baseline.should_collect(t) {
                state.baseline.collect(t, reading.hr, reading.eda, reading.hrv);
                info!(
                    collected = state.baseline.samples().len(),
                    min_samples = state.baseline.settings().min_samples,
                    "Baseline sample collected"
                );

                if state.baseline.has_enough_samples() && state.baseline.compute() {
                    info!(
                        hr = state.baseline.baseline_hr(),
                        eda = state.baseline.baseline_eda(),
                        hrv = state.baseline.baseline_hrv(),
                        "Baseline values computed"
                    );
                }
            }

            let stress = compute_stress_index(reading.hr, reading.eda, reading.hrv, &self.weights);
            let sample = Sample {
                timestamp: self.time_provider.now_iso8601(),
                hr: round_to(reading.hr, 1),
                eda: round_to(reading.eda, 3),
                hrv: round_to(reading.hrv, 1),
                stress: round_to(stress, 1),
                scenario: state.scenario,
            };

            state.clock.advance(stream_interval);
            sample
        };

        debug!(hr = sample.hr, eda = sample.eda, stress = sample.stress, "Tick");
        self.session_log.push(sample.clone());
        Ok(sample)
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    /// Mark the wall-clock start of the served session
    pub fn begin_session(&mut self, start: DateTime<Utc>) {
        self.session_log.set_start_time(start);
    }

    pub fn session_log(&self) -> &SessionLog {
        &self.session_log
    }

    pub fn samples_generated(&self) -> usize {
        self.session_log.len()
    }

    pub fn connector_info(&self) -> ConnectorInfo {
        self.connector.info()
    }

    pub async fn close_connector(&mut self) -> Result<(), ConnectorError> {
        self.connector.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{SensorReading, SimConnector};
    use crate::utils::time::MockTimeProvider;
    use async_trait::async_trait;

    struct FixedConnector {
        reading: SensorReading,
        fail: bool,
    }

    #[async_trait]
    impl SensorConnector for FixedConnector {
        async fn read(&mut self) -> Result<SensorReading, ConnectorError> {
            if self.fail {
                Err(ConnectorError::ReadFailed("unplugged".to_string()))
            } else {
                Ok(self.reading)
            }
        }

        async fn close(&mut self) -> Result<(), ConnectorError> {
            Ok(())
        }

        fn is_connected(&self) -> bool {
            !self.fail
        }
    }

    fn fixed_assembler(context: SimulationContext, fail: bool) -> SampleAssembler {
        let connector = FixedConnector {
            reading: SensorReading { hr: 75.04, eda: 2.00049, hrv: 50.06 },
            fail,
        };
        SampleAssembler::new(
            Box::new(connector),
            context,
            StressWeights::default(),
            Arc::new(MockTimeProvider::from_unix_seconds(1_754_049_600)),
        )
    }

    #[tokio::test]
    async fn test_tick_rounds_and_stamps() {
        let mut assembler = fixed_assembler(SimulationContext::seeded(1), false);
        let sample = assembler.tick(0.1).await.unwrap();

        assert_eq!(sample.hr, 75.0);
        assert_eq!(sample.eda, 2.0);
        assert_eq!(sample.hrv, 50.1);
        assert_eq!(sample.scenario, Scenario::Mixed);
        assert_eq!(sample.timestamp, "2025-08-01T12:00:00.000000+00:00");
        assert_eq!(assembler.samples_generated(), 1);
    }

    #[tokio::test]
    async fn test_tick_advances_clock_by_interval() {
        let context = SimulationContext::seeded(2);
        let mut assembler = fixed_assembler(context.clone(), false);
        for _ in 0..4 {
            assembler.tick(0.5).await.unwrap();
        }
        assert_eq!(context.current_time(), 2.0);
    }

    #[tokio::test]
    async fn test_failed_read_has_no_side_effects() {
        let context = SimulationContext::seeded(3);
        let mut assembler = fixed_assembler(context.clone(), true);

        assert!(assembler.tick(1.0).await.is_err());
        assert_eq!(context.current_time(), 0.0);
        assert_eq!(assembler.samples_generated(), 0);
    }

    #[tokio::test]
    async fn test_baseline_collected_inside_window() {
        let context = SimulationContext::seeded(4);
        context.advance_time(185.0);
        let mut assembler = fixed_assembler(context.clone(), false);

        for _ in 0..9 {
            assembler.tick(1.0).await.unwrap();
        }
        assert!(!context.baseline_status().baseline_computed);

        assembler.tick(1.0).await.unwrap();
        let status = context.baseline_status();
        assert!(status.baseline_computed);
        assert_eq!(status.baseline_samples_collected, 10);
        assert!((status.baseline_hr.unwrap() - 75.04).abs() < 1e-9);

        // Nothing more is collected once computed
        assembler.tick(1.0).await.unwrap();
        assert_eq!(context.baseline_status().baseline_samples_collected, 10);
    }

    #[tokio::test]
    async fn test_resting_period_collects_nothing() {
        let context = SimulationContext::seeded(5);
        let mut assembler = fixed_assembler(context.clone(), false);
        for _ in 0..20 {
            assembler.tick(1.0).await.unwrap();
        }
        assert_eq!(context.baseline_status().baseline_samples_collected, 0);
    }

    #[tokio::test]
    async fn test_simulated_connector_samples_in_range() {
        let context = SimulationContext::seeded(6);
        context.set_scenario(Scenario::Baseline);
        let mut assembler = SampleAssembler::new(
            Box::new(SimConnector::new(context.clone())),
            context.clone(),
            StressWeights::default(),
            Arc::new(MockTimeProvider::from_unix_seconds(0)),
        );

        for _ in 0..5 {
            let sample = assembler.tick(0.1).await.unwrap();
            assert_eq!(sample.scenario, Scenario::Baseline);
            assert!((0.0..=100.0).contains(&sample.stress));
        }
        assert!((context.current_time() - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_close_connector() {
        let context = SimulationContext::seeded(7);
        let mut assembler = SampleAssembler::new(
            Box::new(SimConnector::new(context.clone())),
            context,
            StressWeights::default(),
            Arc::new(MockTimeProvider::from_unix_seconds(0)),
        );
        assembler.close_connector().await.unwrap();
        assert!(!assembler.connector_info().connected);
        assert!(assembler.tick(0.1).await.is_err());
    }
}
