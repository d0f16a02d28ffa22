use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use keel_config::{ConfigLoader, KeelConfig};
use keel_core::SchemaGeneration;
use keel_storage::connection::redact;
use keel_storage::migration::{MigrationStatus, VerifyReport};
use keel_storage::{
    DatabaseConnection, Direction, MigrationError, MigrationReport, MigrationRunner, MigrationSet,
    SchemaInspector,
};
use sea_orm::DbBackend;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

mod cli;
use cli::{Cli, Commands, ConfigCommands, MigrateCommands, SchemaCommands};

/// Load configuration from file or use defaults
fn load_config(config_path: Option<&PathBuf>) -> Result<KeelConfig> {
    let loader = ConfigLoader::new();

    match config_path {
        Some(path) => {
            if path.exists() {
                info!("Loading configuration from: {:?}", path);
                loader
                    .from_file(path)
                    .context(format!("Failed to load configuration from {:?}", path))
            } else {
                warn!("Configuration file not found: {:?}. Using defaults.", path);
                loader
                    .from_env()
                    .context("Failed to load configuration from environment")
            }
        }
        None => {
            debug!("No configuration file specified. Loading from environment or defaults.");
            loader
                .from_env()
                .context("Failed to load configuration from environment")
        }
    }
}

/// Apply the global command-line overrides on top of the loaded configuration
fn apply_cli_overrides(config: &mut KeelConfig, cli: &Cli) -> Result<()> {
    if let Some(url) = &cli.database_url {
        config.database.url = url.clone();
    }

    if let Some(generation) = &cli.generation {
        config.database.migrations.generation = generation
            .parse::<SchemaGeneration>()
            .context("Invalid --generation")?;
    }

    // Every pooled connection to an in-memory SQLite database is a new database
    let url = &config.database.url;
    if url.starts_with("sqlite:") && (url.contains(":memory:") || url.contains("mode=memory")) {
        config.database.max_connections = 1;
        config.database.min_connections = 1;
    }

    config
        .validate_all()
        .context("Invalid configuration after command-line overrides")?;
    Ok(())
}

async fn connect(config: &KeelConfig) -> Result<DatabaseConnection> {
    DatabaseConnection::new(config.database.clone())
        .await
        .context("Failed to connect to database")
}

fn print_report(report: &MigrationReport) {
    for step in &report.completed {
        println!("✅ {} {} ({} ms)", report.direction, step.version, step.duration_ms);
    }
    for version in &report.skipped {
        println!("⏭️  {} already handled by another runner", version);
    }
    if let Some(version) = &report.failed {
        println!("❌ {} {} failed and was rolled back", report.direction, version);
    }
    for version in &report.not_attempted {
        println!("⏸️  {} not attempted", version);
    }

    if report.completed.is_empty() && report.failed.is_none() {
        println!("Nothing to migrate {}", report.direction);
    } else {
        println!(
            "{} migration(s) {} in {} ms",
            report.completed.len(),
            report.direction,
            report.total_duration_ms
        );
    }
}

/// Print whatever a failed run managed to do, then turn the error into a CLI error
fn migration_failed(err: MigrationError) -> anyhow::Error {
    if let Some(report) = err.report() {
        print_report(report);
    }
    error!("Migration failed: {}", err);
    anyhow::Error::new(err).context("Migration failed")
}

fn print_status(generation: SchemaGeneration, status: &MigrationStatus) {
    println!("Schema generation: {}", generation);
    for entry in &status.migrations {
        match entry.applied_at {
            Some(applied_at) if entry.is_drifted() => println!(
                "⚠️  {}  applied {}, changed since",
                entry.version,
                applied_at.format("%Y-%m-%d %H:%M:%S")
            ),
            Some(applied_at) => println!(
                "✅ {}  applied {}",
                entry.version,
                applied_at.format("%Y-%m-%d %H:%M:%S")
            ),
            None => println!("⏳ {}  pending", entry.version),
        }
    }
    for version in &status.unknown {
        println!("❓ {}  unknown to the {} generation", version, generation);
    }
    println!(
        "\n{} applied, {} pending",
        status.applied().len(),
        status.pending().len()
    );
}

fn print_verify(report: &VerifyReport) {
    if report.is_clean() {
        println!("✅ Database schema matches the migrations");
        return;
    }
    for version in &report.pending {
        println!("⏳ {} is pending", version);
    }
    for version in &report.unknown {
        println!("❓ {} is not a known migration", version);
    }
    for version in &report.drifted {
        println!("⚠️  {} changed after it was applied", version);
    }
}

/// Handle `migrate` subcommands
async fn handle_migrate(config: &KeelConfig, command: &MigrateCommands) -> Result<()> {
    let connection = connect(config).await?;
    let runner = MigrationRunner::from_config(&connection);
    let generation = runner.migration_set().generation();
    info!(
        "Using the {} generation with history table {}",
        generation,
        runner.history_table().name()
    );

    match command {
        MigrateCommands::Up { steps } => {
            let report = runner.up(*steps).await.map_err(migration_failed)?;
            print_report(&report);
        }
        MigrateCommands::Down { steps } => {
            let report = runner.down(*steps).await.map_err(migration_failed)?;
            print_report(&report);
        }
        MigrateCommands::Status => {
            let status = runner.status().await.context("Failed to read migration status")?;
            print_status(generation, &status);
        }
        MigrateCommands::Reset => {
            let report = runner.reset().await.map_err(migration_failed)?;
            print_report(&report);
        }
        MigrateCommands::Refresh => {
            let report = runner.refresh().await.map_err(migration_failed)?;
            print_report(&report.reverted);
            print_report(&report.applied);
        }
        MigrateCommands::Verify => {
            let report = runner.verify().await.context("Failed to verify migrations")?;
            print_verify(&report);
            if !report.is_clean() {
                return Err(anyhow::anyhow!(
                    "Database schema does not match the {} generation",
                    generation
                ));
            }
        }
    }

    connection.close().await.context("Failed to close database connection")?;
    Ok(())
}

fn parse_backend(backend: &str) -> Result<DbBackend> {
    match backend.to_lowercase().as_str() {
        "postgres" | "postgresql" => Ok(DbBackend::Postgres),
        "sqlite" => Ok(DbBackend::Sqlite),
        _ => Err(anyhow::anyhow!(
            "Unknown backend: {}. Valid backends: postgres, sqlite",
            backend
        )),
    }
}

/// Handle `schema sql`: render every migration offline
fn handle_schema_sql(generation: SchemaGeneration, backend: &str, direction: &str) -> Result<()> {
    let backend = parse_backend(backend)?;
    let direction: Direction = direction.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let planned = MigrationSet::for_generation(generation)
        .plan_sql(backend, direction)
        .context("Failed to render migrations")?;
    for planned in planned {
        println!("-- {} ({})", planned.version, direction);
        for statement in &planned.statements {
            println!("{};", statement);
        }
        println!();
    }

    Ok(())
}

/// Handle `schema inspect`
async fn handle_schema_inspect(config: &KeelConfig, format: &str) -> Result<()> {
    let connection = connect(config).await?;
    let snapshot = SchemaInspector::new(connection.get_connection())
        .excluding(config.database.migrations.table_name.clone())
        .snapshot()
        .await
        .context("Failed to inspect database schema")?;

    match format.to_lowercase().as_str() {
        "json" => {
            let json_output =
                serde_json::to_string_pretty(&snapshot).context("Failed to serialize to JSON")?;
            println!("{}", json_output);
        }
        "yaml" | "yml" => {
            let yaml_output = serde_yaml::to_string(&snapshot).context("Failed to serialize to YAML")?;
            println!("{}", yaml_output);
        }
        _ => {
            return Err(anyhow::anyhow!(
                "Unknown output format: {}. Valid formats: json, yaml",
                format
            ));
        }
    }

    let dangling = snapshot.dangling_foreign_keys();
    if !dangling.is_empty() {
        warn!("Foreign keys reference missing tables: {}", dangling.join(", "));
    }

    connection.close().await.context("Failed to close database connection")?;
    Ok(())
}

/// Handle configuration validation
fn handle_config_validate(config_file: &PathBuf) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        return Err(anyhow::anyhow!(
            "Configuration file not found: {:?}",
            config_file
        ));
    }

    match load_config(Some(config_file)) {
        Ok(_config) => {
            println!("✅ Configuration file is valid");
            info!("Configuration validation passed");
            Ok(())
        }
        Err(e) => {
            println!("❌ Configuration validation failed: {:#}", e);
            error!("Configuration validation failed: {:#}", e);
            Err(e)
        }
    }
}

/// Handle configuration generation
fn handle_config_generate(output: &PathBuf, force: bool) -> Result<()> {
    info!("Generating configuration at: {:?}", output);

    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        ));
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create output directory")?;
        }
    }

    fs::write(output, KeelConfig::generate_sample()).context("Failed to write configuration file")?;

    println!("✅ Configuration generated at: {:?}", output);
    println!("📝 Edit the file to customize settings for your environment");
    println!(
        "🔧 Validate with: keel config validate --config-file {:?}",
        output
    );

    Ok(())
}

/// Handle configuration display
fn handle_config_show(config: &KeelConfig, format: &str) -> Result<()> {
    info!("Showing configuration (format: {})", format);

    let mut shown = config.clone();
    shown.database.url = redact(&shown.database.url);

    match format.to_lowercase().as_str() {
        "yaml" | "yml" => {
            let yaml_output = serde_yaml::to_string(&shown).context("Failed to serialize to YAML")?;
            println!("{}", yaml_output);
        }
        "json" => {
            let json_output =
                serde_json::to_string_pretty(&shown).context("Failed to serialize to JSON")?;
            println!("{}", json_output);
        }
        _ => {
            return Err(anyhow::anyhow!(
                "Unknown output format: {}. Valid formats: yaml, json",
                format
            ));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first
    let mut config = load_config(cli.config.as_ref())?;
    apply_cli_overrides(&mut config, &cli)?;

    keel_logging::init_logging_from_config(&config.logging, cli.log_level.as_deref())
        .context("Failed to initialize logging")?;
    debug!("Configuration loaded");

    match &cli.command {
        Some(Commands::Migrate { migrate_cmd }) => handle_migrate(&config, migrate_cmd).await,
        Some(Commands::Schema { schema_cmd }) => match schema_cmd {
            SchemaCommands::Sql { backend, direction } => {
                handle_schema_sql(config.database.migrations.generation, backend, direction)
            }
            SchemaCommands::Inspect { format } => handle_schema_inspect(&config, format).await,
        },
        Some(Commands::Config { config_cmd }) => match config_cmd {
            ConfigCommands::Validate { config_file } => handle_config_validate(config_file),
            ConfigCommands::Generate { output, force } => handle_config_generate(output, *force),
            ConfigCommands::Show { format } => handle_config_show(&config, format),
        },
        None => {
            let mut cmd = Cli::command();
            cmd.print_help().context("Failed to print help")?;
            println!();
            Ok(())
        }
    }
}
