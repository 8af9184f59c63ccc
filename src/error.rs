// src/error.rs
//! Unified error handling for biofeedback-core
//!
//! Each layer owns a focused `thiserror` enum; [`BiofeedbackError`] wraps them
//! for callers such as the server binary that cross layer boundaries.

use crate::acquisition::session_log::SessionError;
use crate::config::ConfigError;
use crate::hal::ConnectorError;
use crate::server::protocol::ProtocolError;
use crate::utils::validation::ValidationError;
use thiserror::Error;

/// Convenience result type
pub type BiofeedbackResult<T> = Result<T, BiofeedbackError>;

/// Top-level error for the biofeedback system
#[derive(Debug, Error)]
pub enum BiofeedbackError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

impl BiofeedbackError {
    /// Whether the failure only affects the current operation
    pub fn is_recoverable(&self) -> bool {
        match self {
            BiofeedbackError::Protocol(_) | BiofeedbackError::Validation(_) => true,
            BiofeedbackError::Connector(ConnectorError::ReadFailed(_)) => true,
            BiofeedbackError::WebSocket(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_from_layer_errors() {
        let err: BiofeedbackError = ConnectorError::NotConnected("SimConnector".to_string()).into();
        assert!(matches!(err, BiofeedbackError::Connector(_)));
        assert!(err.to_string().contains("SimConnector connector is not connected"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_protocol_errors_are_recoverable() {
        let err: BiofeedbackError = ProtocolError::InvalidJson("eof".to_string()).into();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_result_alias_with_question_mark() {
        fn parse(raw: &str) -> BiofeedbackResult<serde_json::Value> {
            Ok(serde_json::from_str(raw)?)
        }
        assert!(parse("{}").is_ok());
        assert!(matches!(parse("{"), Err(BiofeedbackError::Json(_))));
    }
}
