//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "keel", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Database URL, overriding the configuration
    #[arg(long, value_name = "URL", global = true)]
    pub database_url: Option<String>,

    /// Schema generation: legacy, current
    #[arg(long, value_name = "GENERATION", global = true)]
    pub generation: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply, revert and inspect migrations
    Migrate {
        #[command(subcommand)]
        migrate_cmd: MigrateCommands,
    },

    /// Render or inspect the schema
    Schema {
        #[command(subcommand)]
        schema_cmd: SchemaCommands,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum MigrateCommands {
    /// Apply pending migrations
    Up {
        /// Apply at most this many migrations
        #[arg(long, value_name = "N")]
        steps: Option<usize>,
    },

    /// Revert applied migrations, newest first
    Down {
        /// Number of migrations to revert
        #[arg(long, value_name = "N", default_value = "1")]
        steps: usize,
    },

    /// Show applied and pending migrations
    Status,

    /// Revert every applied migration
    Reset,

    /// Revert every applied migration, then apply all of them again
    Refresh,

    /// Compare the database history with the known migrations
    Verify,
}

#[derive(Subcommand)]
pub enum SchemaCommands {
    /// Print the SQL of every migration without connecting
    Sql {
        /// Target backend: postgres, sqlite
        #[arg(long, value_name = "BACKEND", default_value = "postgres")]
        backend: String,

        /// Direction: up, down
        #[arg(long, value_name = "DIRECTION", default_value = "up")]
        direction: String,
    },

    /// Describe the tables, keys and indexes of the connected database
    Inspect {
        /// Output format: json, yaml
        #[arg(long, value_name = "FORMAT", default_value = "json")]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output file path
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration in use
    Show {
        /// Output format: yaml, json
        #[arg(long, value_name = "FORMAT", default_value = "yaml")]
        format: String,
    },
}
