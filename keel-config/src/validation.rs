//! Configuration validation traits and utilities

use crate::error::{ConfigError, ConfigResult};

/// Trait for validatable configuration
pub trait Validatable {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;

    /// Get the domain name for error reporting
    fn domain_name(&self) -> &'static str;

    /// Helper to create a domain-specific validation error
    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::DomainError {
            domain: self.domain_name().to_string(),
            message: message.into(),
        }
    }
}

/// Validate a required string field
pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }
    Ok(())
}

/// Validate a positive number
pub fn validate_positive<T>(value: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be greater than 0, got {}", field_name, value),
        });
    }
    Ok(())
}

/// Validate a database URL: it must parse and use a supported scheme
pub fn validate_database_url(url: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    validate_required_string(url, field_name, domain)?;

    let parsed = url::Url::parse(url).map_err(|e| ConfigError::DomainError {
        domain: domain.to_string(),
        message: format!("{} has invalid URL format: {}", field_name, e),
    })?;

    validate_enum_choice(
        parsed.scheme(),
        &["sqlite", "postgres", "postgresql"],
        &format!("{} scheme", field_name),
        domain,
    )
}

/// Validate a plain SQL identifier (letters, digits, underscores; no leading digit)
pub fn validate_identifier(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    validate_required_string(value, field_name, domain)?;

    let mut chars = value.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_well || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} '{}' is not a valid SQL identifier", field_name, value),
        });
    }

    // PostgreSQL truncates identifiers beyond 63 bytes
    if value.len() > 63 {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be longer than 63 characters", field_name),
        });
    }

    Ok(())
}

/// Validate an enum choice
pub fn validate_enum_choice<T>(
    value: &str,
    valid_choices: &[T],
    field_name: &str,
    domain: &str,
) -> ConfigResult<()>
where
    T: AsRef<str>,
{
    let valid: Vec<&str> = valid_choices.iter().map(|c| c.as_ref()).collect();

    if !valid.iter().any(|&v| v.eq_ignore_ascii_case(value)) {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!(
                "{} has invalid value '{}'. Valid choices: {}",
                field_name,
                value,
                valid.join(", ")
            ),
        });
    }

    Ok(())
}
