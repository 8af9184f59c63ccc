// src/server/protocol.rs
//! JSON wire protocol
//!
//! Every client frame is a JSON object carrying a `command` field; every
//! server frame is a JSON object tagged by `type`.

use crate::acquisition::{BaselineStatus, Sample};
use crate::config::constants::streaming::AVAILABLE_COMMANDS;
use crate::hal::simulation::Scenario;
use crate::hal::ConnectorInfo;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

/// Request decoding failures. None of these mutate server state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("Invalid JSON format")]
    InvalidJson(String),

    #[error("Request must be a JSON object")]
    NotAnObject,

    #[error("Missing or non-string 'command' field")]
    MissingCommand,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid frequency value: {0}. Must be a number.")]
    InvalidFrequencyValue(String),

    #[error("Invalid frequency: {0}Hz. Must be between 0.1 and 50.0 Hz")]
    FrequencyOutOfRange(f64),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),
}

/// A decoded client request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Once,
    Subscribe,
    Unsubscribe,
    Status,
    SetFrequency(f64),
    SetScenario(Scenario),
}

impl Command {
    /// Decode one text frame. Command names are case-insensitive.
    pub fn parse(raw: &str) -> Result<Command, ProtocolError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;
        let request = value.as_object().ok_or(ProtocolError::NotAnObject)?;

        let name = request
            .get("command")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingCommand)?
            .to_lowercase();

        match name.as_str() {
            "once" => Ok(Command::Once),
            "subscribe" => Ok(Command::Subscribe),
            "unsubscribe" => Ok(Command::Unsubscribe),
            "status" => Ok(Command::Status),
            "set_frequency" => parse_frequency(request.get("hz")).map(Command::SetFrequency),
            "set_scenario" => parse_scenario(request.get("scenario")).map(Command::SetScenario),
            _ => Err(ProtocolError::UnknownCommand(name)),
        }
    }
}

fn parse_frequency(hz: Option<&Value>) -> Result<f64, ProtocolError> {
    let parsed = match hz {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(value) if value.is_finite() => Ok(value),
        _ => Err(ProtocolError::InvalidFrequencyValue(match hz {
            None => "missing".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        })),
    }
}

fn parse_scenario(scenario: Option<&Value>) -> Result<Scenario, ProtocolError> {
    match scenario {
        Some(Value::String(name)) => {
            Scenario::from_str(name).map_err(|_| ProtocolError::InvalidScenario(name.clone()))
        }
        Some(other) => Err(ProtocolError::InvalidScenario(other.to_string())),
        None => Err(ProtocolError::InvalidScenario(String::new())),
    }
}

/// `server_info` block attached to every stream message
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub frequency_hz: f64,
    pub connected_clients: usize,
}

/// Broadcast payload: the sample fields plus `server_info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamPayload {
    #[serde(flatten)]
    pub sample: Sample,
    pub server_info: ServerInfo,
}

/// Body of a `status` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub running: bool,
    pub uptime_seconds: f64,
    pub connected_clients: usize,
    pub stream_frequency_hz: f64,
    pub samples_generated: usize,
    pub scenario: Scenario,
    pub connector: ConnectorInfo,
    pub baseline: BaselineStatus,
}

/// Every frame the server can send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Sample {
        data: Sample,
    },
    SubscriptionConfirmed {
        client_id: u64,
        stream_frequency_hz: f64,
        message: String,
    },
    UnsubscriptionConfirmed {
        message: String,
    },
    Status {
        server: ServerStatus,
    },
    FrequencyChanged {
        old_frequency_hz: f64,
        new_frequency_hz: f64,
        stream_interval_seconds: f64,
        message: String,
    },
    ScenarioChanged {
        current_scenario: Scenario,
        message: String,
    },
    Stream {
        data: StreamPayload,
    },
    ServerShutdown {
        message: String,
    },
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        current_frequency_hz: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        valid_scenarios: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        available_commands: Option<Vec<String>>,
    },
}

impl Response {
    /// Plain error frame with only a message
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
            current_frequency_hz: None,
            valid_scenarios: None,
            available_commands: None,
        }
    }

    /// Error frame for a rejected request, with the context clients need to retry
    pub fn from_protocol_error(err: &ProtocolError, current_frequency_hz: f64) -> Self {
        let mut response = Response::error(err.to_string());
        if let Response::Error {
            current_frequency_hz: freq,
            valid_scenarios,
            available_commands,
            ..
        } = &mut response
        {
            match err {
                ProtocolError::InvalidFrequencyValue(_) | ProtocolError::FrequencyOutOfRange(_) => {
                    *freq = Some(current_frequency_hz);
                }
                ProtocolError::InvalidScenario(_) => {
                    *valid_scenarios = Some(Scenario::names().iter().map(|s| s.to_string()).collect());
                }
                ProtocolError::UnknownCommand(_) | ProtocolError::MissingCommand => {
                    *available_commands =
                        Some(AVAILABLE_COMMANDS.iter().map(|s| s.to_string()).collect());
                }
                ProtocolError::InvalidJson(_) | ProtocolError::NotAnObject => {}
            }
        }
        response
    }

    pub fn server_shutdown() -> Self {
        Response::ServerShutdown {
            message: "Server is shutting down".to_string(),
        }
    }

    /// Serialize for the wire
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({
                "type": "error",
                "message": format!("Server error: {}", e),
            })
            .to_string()
        })
    }
}
