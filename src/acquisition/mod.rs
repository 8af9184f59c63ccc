// src/acquisition/mod.rs
//! Sample acquisition: baseline protocol, tick assembly and session logging

pub mod baseline_protocol;
pub mod sample_assembler;
pub mod session_log;

pub use baseline_protocol::{BaselinePhase, BaselineProtocol, BaselineSample, BaselineSettings, BaselineStatus};
pub use sample_assembler::{Sample, SampleAssembler};
pub use session_log::{SessionArtifact, SessionError, SessionInfo, SessionLog};
