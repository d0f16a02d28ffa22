//! Configuration management for Keel
//!
//! Configuration is split by domain (database, logging), loaded from YAML
//! and overridden from `KEEL_*` environment variables. Every domain
//! validates itself through [`validation::Validatable`].

pub mod domains;
pub mod error;
pub mod loader;
pub mod validation;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    database::{DatabaseConfig, MigrationConfig},
    logging::{LogFormat, LogLevel, LoggingConfig},
    KeelConfig,
};

// Re-export utilities
pub use domains::utils::serde_duration;
