//! Configuration loading and environment variable handling

use std::path::Path;
use std::str::FromStr;

use keel_core::SchemaGeneration;

use crate::domains::database::DatabaseConfig;
use crate::domains::logging::{LogFormat, LogLevel, LoggingConfig};
use crate::domains::KeelConfig;
use crate::error::{ConfigError, ConfigResult};

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with the `KEEL` prefix
    pub fn new() -> Self {
        Self {
            prefix: "KEEL".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<KeelConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: KeelConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::ParseError {
                path: path.to_path_buf(),
                source,
            })?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<KeelConfig> {
        let mut config = KeelConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load from a file when one is given, otherwise from the environment
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<KeelConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    fn apply_env_overrides(&self, config: &mut KeelConfig) -> ConfigResult<()> {
        self.apply_database_overrides(&mut config.database)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    fn apply_database_overrides(&self, config: &mut DatabaseConfig) -> ConfigResult<()> {
        if let Ok(url) = self.get_env_var("DATABASE_URL") {
            config.url = url;
        }

        if let Ok(max) = self.get_env_var("DATABASE_MAX_CONNECTIONS") {
            config.max_connections = max.parse().map_err(|e| {
                ConfigError::EnvError(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e))
            })?;
        }

        if let Ok(table) = self.get_env_var("MIGRATION_TABLE") {
            config.migrations.table_name = table;
        }

        if let Ok(generation) = self.get_env_var("SCHEMA_GENERATION") {
            config.migrations.generation = SchemaGeneration::from_str(&generation)
                .map_err(|e| ConfigError::EnvError(format!("Invalid SCHEMA_GENERATION: {}", e)))?;
        }

        Ok(())
    }

    fn apply_logging_overrides(&self, config: &mut LoggingConfig) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
