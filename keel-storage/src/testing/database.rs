//! Isolated SQLite databases for tests

use keel_config::{DatabaseConfig, MigrationConfig};
use keel_core::SchemaGeneration;
use sea_orm::{ConnectionTrait, DatabaseConnection as SeaConnection, DbErr, Statement};
use std::time::Duration;
use tempfile::TempDir;
use thiserror::Error;

use crate::connection::DatabaseConnection;
use crate::inspect::{SchemaInspector, SchemaSnapshot};
use crate::migration::{MigrationRunner, MigrationSet};

/// A file-backed SQLite database removed when dropped
pub struct TestDatabase {
    _temp_dir: TempDir,
    pub connection: DatabaseConnection,
}

impl TestDatabase {
    /// Create an empty database
    pub async fn new() -> Result<Self, TestDatabaseError> {
        Self::with_generation(SchemaGeneration::default()).await
    }

    /// Create an empty database whose config targets `generation`
    pub async fn with_generation(generation: SchemaGeneration) -> Result<Self, TestDatabaseError> {
        let temp_dir = TempDir::new().map_err(|e| TestDatabaseError::TempDirCreation(e.to_string()))?;
        let db_path = temp_dir.path().join("test.db");

        // One connection, so every statement sees the same transaction state
        let config = DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", db_path.display()),
            max_connections: 1,
            min_connections: 1,
            connection_timeout: Duration::from_secs(5),
            migrations: MigrationConfig {
                generation,
                ..MigrationConfig::default()
            },
            ..DatabaseConfig::default()
        };

        let connection = DatabaseConnection::new(config)
            .await
            .map_err(|e| TestDatabaseError::Connection(e.to_string()))?;

        Ok(Self {
            _temp_dir: temp_dir,
            connection,
        })
    }

    /// Create a database with every migration of `generation` applied
    pub async fn migrated(generation: SchemaGeneration) -> Result<Self, TestDatabaseError> {
        let db = Self::with_generation(generation).await?;
        db.runner(generation)
            .up(None)
            .await
            .map_err(|e| TestDatabaseError::Migration(e.to_string()))?;
        Ok(db)
    }

    pub fn db(&self) -> &SeaConnection {
        self.connection.get_connection()
    }

    /// A runner for `generation` on this database
    pub fn runner(&self, generation: SchemaGeneration) -> MigrationRunner {
        MigrationRunner::new(self.db().clone(), MigrationSet::for_generation(generation))
    }

    /// Run raw SQL, returning the number of affected rows
    pub async fn execute(&self, sql: &str) -> Result<u64, DbErr> {
        Ok(self.db().execute_unprepared(sql).await?.rows_affected())
    }

    /// Single integer selected as `value`, `None` when no row matches
    pub async fn scalar(&self, sql: &str) -> Result<Option<i64>, DbErr> {
        let backend = self.db().get_database_backend();
        match self.db().query_one(Statement::from_string(backend, sql)).await? {
            Some(row) => row.try_get("", "value"),
            None => Ok(None),
        }
    }

    pub async fn count(&self, table: &str) -> Result<i64, DbErr> {
        let sql = format!("SELECT COUNT(*) AS value FROM \"{}\"", table);
        Ok(self.scalar(&sql).await?.unwrap_or(0))
    }

    pub async fn snapshot(&self) -> Result<SchemaSnapshot, DbErr> {
        SchemaInspector::new(self.db()).snapshot().await
    }
}

/// Test database errors
#[derive(Debug, Error)]
pub enum TestDatabaseError {
    #[error("Failed to create temporary directory: {0}")]
    TempDirCreation(String),

    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}
