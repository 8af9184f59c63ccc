// src/config/loader.rs
//! Layered configuration loader
//!
//! Sources are merged in order: built-in defaults, each existing TOML file,
//! then `BIOFEEDBACK__SECTION__KEY` environment variables. The merged result
//! is validated before it is handed out.

use crate::config::{constants::paths, SystemConfig};
use crate::utils::validation::ValidationError;
use ::config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration source error: {0}")]
    Source(#[from] ::config::ConfigError),

    #[error("Configuration validation errors: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Configuration serialization error: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration loader
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: String,
    current_config: SystemConfig,
}

impl ConfigLoader {
    /// Loader over the default search paths
    pub fn new() -> Self {
        Self::with_paths(Self::discover_config_paths())
    }

    /// Loader over explicit paths, later paths take precedence
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            env_prefix: paths::ENV_PREFIX.to_string(),
            current_config: SystemConfig::default(),
        }
    }

    /// Override the environment variable prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Add a file that must exist, taking precedence over the search paths
    pub fn require_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        self.config_paths.push(path.to_path_buf());
        Ok(())
    }

    /// Load, merge and validate the system configuration
    pub fn load_system_config(&mut self) -> Result<SystemConfig, ConfigError> {
        let config = self.load_and_merge_configs()?;
        self.current_config = config.clone();
        Ok(config)
    }

    /// Last successfully loaded configuration
    pub fn get_current_config(&self) -> &SystemConfig {
        &self.current_config
    }

    /// Validate one TOML file on top of the defaults without loading it
    pub fn validate_config_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: SystemConfig = Config::builder()
            .add_source(Config::try_from(&SystemConfig::default())?)
            .add_source(File::from_str(&content, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate().map_err(ConfigError::Validation)
    }

    /// Export current configuration to a TOML file
    pub fn export_config<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        write_config(&self.current_config, path)
    }

    fn load_and_merge_configs(&self) -> Result<SystemConfig, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&SystemConfig::default())?);

        for config_path in &self.config_paths {
            if config_path.exists() {
                debug!(path = %config_path.display(), "Merging configuration file");
                builder = builder.add_source(
                    File::from(config_path.as_path())
                        .format(FileFormat::Toml)
                        .required(true),
                );
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .separator(paths::ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config: SystemConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from(paths::DEFAULT_CONFIG_FILE),
            PathBuf::from(paths::USER_CONFIG_FILE),
        ]
    }
}

/// Write `config` as pretty TOML
pub fn write_config<P: AsRef<Path>>(config: &SystemConfig, path: P) -> Result<(), ConfigError> {
    let toml_content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize(e.to_string()))?;

    std::fs::write(path, toml_content)?;
    Ok(())
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::simulation::Scenario;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(content: &str) -> NamedTempFile {
        let mut temp_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    #[test]
    fn test_config_loader_creation() {
        let loader = ConfigLoader::new();
        assert_eq!(loader.config_paths().len(), 2);
    }

    #[test]
    fn test_load_defaults_without_files() {
        let mut loader = ConfigLoader::with_paths(vec![PathBuf::from("/nonexistent/biofeedback.toml")])
            .with_env_prefix("BIOFEEDBACK_TEST_DEFAULTS");
        let config = loader.load_system_config().unwrap();
        assert_eq!(config, SystemConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = toml_file(
            r#"
[server]
port = 9100
stream_frequency_hz = 2.5

[simulation]
initial_scenario = "stress_buildup"
rng_seed = 42
"#,
        );

        let mut loader = ConfigLoader::with_paths(vec![file.path().to_path_buf()])
            .with_env_prefix("BIOFEEDBACK_TEST_FILE");
        let config = loader.load_system_config().unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.stream_frequency_hz, 2.5);
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.simulation.initial_scenario, Scenario::StressBuildup);
        assert_eq!(config.simulation.rng_seed, Some(42));
        assert_eq!(loader.get_current_config(), &config);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let file = toml_file(
            r#"
[server]
stream_frequency_hz = 75.0
"#,
        );

        let loader = ConfigLoader::new();
        let err = loader.validate_config_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("stream_frequency_hz"));
    }

    #[test]
    fn test_valid_file_accepted() {
        let file = toml_file(
            r#"
[session]
output_dir = "sessions"
"#,
        );

        assert!(ConfigLoader::new().validate_config_file(file.path()).is_ok());
    }

    #[test]
    fn test_environment_override() {
        std::env::set_var("BIOFEEDBACK_TEST_ENV__SERVER__PORT", "9300");

        let mut loader = ConfigLoader::with_paths(Vec::new()).with_env_prefix("BIOFEEDBACK_TEST_ENV");
        let config = loader.load_system_config().unwrap();

        std::env::remove_var("BIOFEEDBACK_TEST_ENV__SERVER__PORT");
        assert_eq!(config.server.port, 9300);
    }

    #[test]
    fn test_require_missing_file() {
        let mut loader = ConfigLoader::with_paths(Vec::new());
        assert!(matches!(
            loader.require_file("/nonexistent/custom.toml"),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_config_export() {
        let mut loader = ConfigLoader::with_paths(Vec::new()).with_env_prefix("BIOFEEDBACK_TEST_EXPORT");
        loader.load_system_config().unwrap();
        let temp_file = NamedTempFile::new().unwrap();

        assert!(loader.export_config(temp_file.path()).is_ok());

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("[server]"));
        assert!(content.contains("[simulation.baseline]"));
    }
}
