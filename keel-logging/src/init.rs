use anyhow::Result;
use keel_config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Build the event filter.
///
/// An explicit override (the CLI `--log-level`) wins, then `RUST_LOG`, then
/// the configured level.
pub fn build_filter(config: &LoggingConfig, override_level: Option<&str>) -> EnvFilter {
    if let Some(level) = override_level {
        if let Ok(filter) = EnvFilter::try_new(level) {
            return filter;
        }
    }

    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.as_str()))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize logging from configuration
pub fn init_logging_from_config(config: &LoggingConfig, override_level: Option<&str>) -> Result<()> {
    let env_filter = build_filter(config, override_level);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_writer(std::io::stderr);

    // Use try_init to avoid panic if global subscriber already set
    let result = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if result.is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

/// Initialize simple tracing for basic console output
pub fn init_simple_tracing(log_level: &str) -> Result<()> {
    init_logging_from_config(&LoggingConfig::default(), Some(log_level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_config::LogLevel;
    use temp_env::with_var;

    #[test]
    fn test_override_wins() {
        let config = LoggingConfig {
            level: LogLevel::Error,
            ..LoggingConfig::default()
        };

        with_var("RUST_LOG", Some("warn"), || {
            let filter = build_filter(&config, Some("trace"));
            assert_eq!(filter.to_string(), "trace");
        });
    }

    #[test]
    fn test_rust_log_beats_config() {
        let config = LoggingConfig {
            level: LogLevel::Error,
            ..LoggingConfig::default()
        };

        with_var("RUST_LOG", Some("keel_storage=debug"), || {
            assert_eq!(build_filter(&config, None).to_string(), "keel_storage=debug");
        });

        with_var("RUST_LOG", None::<&str>, || {
            assert_eq!(build_filter(&config, None).to_string(), "error");
        });
    }

    #[test]
    fn test_repeated_initialisation_is_harmless() {
        let config = LoggingConfig {
            format: LogFormat::Json,
            ..LoggingConfig::default()
        };
        assert!(init_logging_from_config(&config, Some("debug")).is_ok());
        assert!(init_simple_tracing("info").is_ok());
    }
}
