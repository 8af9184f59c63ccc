// src/acquisition/session_log.rs
//! In-memory session log and the JSON artifact written at shutdown

use crate::acquisition::sample_assembler::Sample;
use crate::config::constants::session::FILE_TIMESTAMP_FORMAT;
use crate::utils::time::format_iso8601;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Session persistence errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write session file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Session write timed out after {0} ms")]
    Timeout(u64),
}

/// Ordered record of every sample generated by one server instance
#[derive(Debug, Clone)]
pub struct SessionLog {
    start_time: DateTime<Utc>,
    samples: Vec<Sample>,
}

/// Summary block at the top of a session artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub start_time: String,
    pub duration_seconds: f64,
    pub samples_generated: usize,
    pub stream_frequency_hz: f64,
}

/// Persisted session document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionArtifact {
    pub session_info: SessionInfo,
    pub data: Vec<Sample>,
}

impl SessionLog {
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            samples: Vec::new(),
        }
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Restamp the session start, keeping any samples already logged
    pub fn set_start_time(&mut self, start_time: DateTime<Utc>) {
        self.start_time = start_time;
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Snapshot the log as an artifact ending at `now`
    pub fn to_artifact(&self, now: DateTime<Utc>, stream_frequency_hz: f64) -> SessionArtifact {
        let duration = now.signed_duration_since(self.start_time);
        let duration_seconds = duration
            .num_microseconds()
            .map(|us| us as f64 / 1_000_000.0)
            .unwrap_or_else(|| duration.num_milliseconds() as f64 / 1000.0)
            .max(0.0);

        SessionArtifact {
            session_info: SessionInfo {
                start_time: format_iso8601(&self.start_time),
                duration_seconds,
                samples_generated: self.samples.len(),
                stream_frequency_hz,
            },
            data: self.samples.clone(),
        }
    }
}

/// `<output_dir>/<prefix>_<YYYYmmdd_HHMMSS>.json`
pub fn artifact_path(output_dir: &Path, file_prefix: &str, now: DateTime<Utc>) -> PathBuf {
    output_dir.join(format!("{}_{}.json", file_prefix, now.format(FILE_TIMESTAMP_FORMAT)))
}

/// Write `artifact` as pretty-printed JSON, creating `output_dir` if needed
pub async fn write_artifact(
    artifact: &SessionArtifact,
    output_dir: &Path,
    file_prefix: &str,
    now: DateTime<Utc>,
) -> Result<PathBuf, SessionError> {
    let json = serde_json::to_string_pretty(artifact)?;

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|source| SessionError::CreateDir {
            path: output_dir.display().to_string(),
            source,
        })?;

    let path = artifact_path(output_dir, file_prefix, now);
    tokio::fs::write(&path, json)
        .await
        .map_err(|source| SessionError::Write {
            path: path.display().to_string(),
            source,
        })?;

    info!(
        path = %path.display(),
        samples = artifact.session_info.samples_generated,
        "Session data saved"
    );
    Ok(path)
}
