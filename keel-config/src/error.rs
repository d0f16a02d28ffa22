//! Configuration error types

use std::path::PathBuf;

use thiserror::Error;

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating a [`KeelConfig`](crate::KeelConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A `KEEL_*` variable is present but holds an unusable value
    #[error("Environment variable error: {0}")]
    EnvError(String),

    #[error("Domain configuration error in {domain}: {message}")]
    DomainError { domain: String, message: String },
}
