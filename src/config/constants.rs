// src/config/constants.rs
//! System-wide configuration constants

/// Physiological signal limits and resting defaults
pub mod physiology {
    pub const HR_MIN_BPM: f64 = 50.0;
    pub const HR_MAX_BPM: f64 = 180.0;
    pub const EDA_MIN_MICROSIEMENS: f64 = 0.1;
    pub const EDA_MAX_MICROSIEMENS: f64 = 10.0;

    pub const RESTING_HR_BPM: f64 = 75.0;
    pub const RESTING_EDA_MICROSIEMENS: f64 = 2.0;
    pub const RESTING_HRV_MS: f64 = 50.0;

    pub const MILLISECONDS_PER_MINUTE: f64 = 60_000.0;
}

/// Heart-rate variability tracking
pub mod hrv {
    pub const DEFAULT_HISTORY_WINDOW: usize = 20;
    pub const MIN_HISTORY_WINDOW: usize = 2;
    pub const MAX_HISTORY_WINDOW: usize = 1024;
    pub const SDNN_MIN_MS: f64 = 10.0;
    pub const SDNN_MAX_MS: f64 = 200.0;
}

/// Stress index normalization ranges and default weights
pub mod stress {
    pub const HR_FLOOR_BPM: f64 = 45.0;
    pub const HR_CEILING_BPM: f64 = 180.0;
    pub const EDA_CEILING_MICROSIEMENS: f64 = 10.0;
    pub const HRV_FLOOR_MS: f64 = 10.0;
    pub const HRV_CEILING_MS: f64 = 200.0;

    pub const DEFAULT_HR_WEIGHT: f64 = 0.33;
    pub const DEFAULT_EDA_WEIGHT: f64 = 0.33;
    pub const DEFAULT_HRV_WEIGHT: f64 = 0.34;

    pub const INDEX_SCALE: f64 = 100.0;
}

/// Baseline acquisition protocol timing
pub mod baseline {
    pub const DEFAULT_RESTING_PERIOD_SECONDS: f64 = 180.0;
    pub const DEFAULT_BASELINE_WINDOW_SECONDS: f64 = 60.0;
    pub const DEFAULT_MIN_SAMPLES: usize = 10;
}

/// Streaming server constants
pub mod streaming {
    pub const DEFAULT_HOST: &str = "localhost";
    pub const DEFAULT_PORT: u16 = 8765;
    pub const DEFAULT_FREQUENCY_HZ: f64 = 10.0;
    pub const MIN_FREQUENCY_HZ: f64 = 0.1;
    pub const MAX_FREQUENCY_HZ: f64 = 50.0;

    pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 1000;
    pub const DEFAULT_OUTBOUND_QUEUE_SIZE: usize = 64;
    pub const MIN_OUTBOUND_QUEUE_SIZE: usize = 1;

    pub const AVAILABLE_COMMANDS: [&str; 6] = [
        "once",
        "subscribe",
        "unsubscribe",
        "status",
        "set_frequency",
        "set_scenario",
    ];
}

/// Session artifact persistence
pub mod session {
    pub const DEFAULT_OUTPUT_DIR: &str = "output";
    pub const DEFAULT_FILE_PREFIX: &str = "biofeedback_session";
    pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5000;
    pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
}

/// Environment and file discovery
pub mod paths {
    pub const ENV_PREFIX: &str = "BIOFEEDBACK";
    pub const ENV_SEPARATOR: &str = "__";
    pub const DEFAULT_CONFIG_FILE: &str = "config/biofeedback.toml";
    pub const USER_CONFIG_FILE: &str = "biofeedback.toml";
}
