// src/server/dispatcher.rs
//! Per-connection request handling
//!
//! Maps each decoded [`Command`] onto the shared server state and always
//! answers with exactly one [`Response`]. Rejected requests never mutate
//! state.

use crate::hal::simulation::Scenario;
use crate::server::protocol::{Command, ProtocolError, Response, ServerStatus};
use crate::server::registry::{MessageSink, SubscriberId};
use crate::server::state::ServerState;
use crate::utils::conversion::round_to;
use std::sync::Arc;
use tracing::{error, info, warn};

/// The connection a request arrived on
#[derive(Clone)]
pub struct Caller {
    pub id: SubscriberId,
    pub sink: Arc<dyn MessageSink>,
}

pub struct CommandDispatcher {
    state: Arc<ServerState>,
}

impl CommandDispatcher {
    pub fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }

    /// Handle one raw text frame from `caller`
    pub async fn dispatch(&self, raw: &str, caller: &Caller) -> Response {
        match Command::parse(raw) {
            Ok(command) => self.execute(command, caller).await,
            Err(e) => {
                warn!(connection = caller.id, error = %e, "Rejected client request");
                Response::from_protocol_error(&e, self.state.stream.frequency_hz())
            }
        }
    }

    pub async fn execute(&self, command: Command, caller: &Caller) -> Response {
        match command {
            Command::Once => self.once().await,
            Command::Subscribe => self.subscribe(caller),
            Command::Unsubscribe => self.unsubscribe(caller),
            Command::Status => self.status().await,
            Command::SetFrequency(hz) => self.set_frequency(hz),
            Command::SetScenario(scenario) => self.set_scenario(scenario).await,
        }
    }

    async fn once(&self) -> Response {
        let interval = self.state.stream.interval_seconds();
        match self.state.assembler.lock().await.tick(interval).await {
            Ok(sample) => Response::Sample { data: sample },
            Err(e) => {
                error!(error = %e, "Sample generation failed");
                Response::error(format!("Server error: {}", e))
            }
        }
    }

    fn subscribe(&self, caller: &Caller) -> Response {
        self.state.registry.add(caller.id, Arc::clone(&caller.sink));
        let client_id = self.state.next_client_id();
        info!(
            connection = caller.id,
            total = self.state.registry.len(),
            "Client subscribed for streaming"
        );

        Response::SubscriptionConfirmed {
            client_id,
            stream_frequency_hz: self.state.stream.frequency_hz(),
            message: "Subscribed to continuous biofeedback stream".to_string(),
        }
    }

    fn unsubscribe(&self, caller: &Caller) -> Response {
        self.state.registry.remove(caller.id);
        info!(
            connection = caller.id,
            remaining = self.state.registry.len(),
            "Client unsubscribed"
        );

        Response::UnsubscriptionConfirmed {
            message: "Unsubscribed from biofeedback stream".to_string(),
        }
    }

    async fn status(&self) -> Response {
        let (samples_generated, connector) = {
            let assembler = self.state.assembler.lock().await;
            (assembler.samples_generated(), assembler.connector_info())
        };

        Response::Status {
            server: ServerStatus {
                running: self.state.is_running(),
                uptime_seconds: round_to(self.state.uptime_seconds(), 1),
                connected_clients: self.state.registry.len(),
                stream_frequency_hz: self.state.stream.frequency_hz(),
                samples_generated,
                scenario: self.state.context.scenario(),
                connector,
                baseline: self.state.context.baseline_status(),
            },
        }
    }

    fn set_frequency(&self, hz: f64) -> Response {
        match self.state.stream.set_frequency_hz(hz) {
            Ok(old) => {
                info!(old_hz = old, new_hz = hz, "Streaming frequency changed");
                Response::FrequencyChanged {
                    old_frequency_hz: old,
                    new_frequency_hz: hz,
                    stream_interval_seconds: self.state.stream.interval_seconds(),
                    message: format!("Streaming frequency changed to {}Hz", hz),
                }
            }
            Err(_) => Response::from_protocol_error(
                &ProtocolError::FrequencyOutOfRange(hz),
                self.state.stream.frequency_hz(),
            ),
        }
    }

    async fn set_scenario(&self, scenario: Scenario) -> Response {
        // Scenario changes serialize with ticks
        let _tick_guard = self.state.assembler.lock().await;
        self.state.context.set_scenario(scenario);
        info!(%scenario, "Scenario changed");

        Response::ScenarioChanged {
            current_scenario: scenario,
            message: format!("Simulation scenario changed to {}", scenario),
        }
    }
}
