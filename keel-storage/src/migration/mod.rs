//! Migration definition and execution
//!
//! A [`SchemaMigration`] only describes statements; [`MigrationRunner`]
//! executes them, one transaction per migration, and keeps the history table
//! in step.

pub mod history;
pub mod lock;
pub mod plan;
pub mod report;
pub mod runner;

pub use history::{AppliedMigration, HistoryTable, DEFAULT_HISTORY_TABLE};
pub use plan::{Direction, MigrationPlan};
pub use report::{MigrationReport, MigrationStatus, RefreshReport, StatusEntry, StepOutcome, VerifyReport};
pub use runner::MigrationRunner;

use keel_core::SchemaGeneration;
use sea_orm::{DbBackend, DbErr};
use sea_orm_migration::MigrationName;
use serde::Serialize;
use thiserror::Error;

/// One versioned schema change.
///
/// The version is the migration's name, derived from its file name with
/// `#[derive(DeriveMigrationName)]`.
pub trait SchemaMigration: MigrationName + Send + Sync {
    fn up(&self, plan: &mut MigrationPlan) -> Result<(), DbErr>;

    fn down(&self, plan: &mut MigrationPlan) -> Result<(), DbErr>;

    /// Render the statements for one backend and direction
    fn plan(&self, backend: DbBackend, direction: Direction) -> Result<MigrationPlan, DbErr> {
        let mut plan = MigrationPlan::new(backend);
        match direction {
            Direction::Up => self.up(&mut plan)?,
            Direction::Down => self.down(&mut plan)?,
        }
        Ok(plan)
    }

    /// Checksum of the `up` statements, as recorded in the history table
    fn checksum(&self, backend: DbBackend) -> Result<String, DbErr> {
        Ok(self.plan(backend, Direction::Up)?.checksum())
    }
}

/// Ordered migrations making up one schema generation
pub struct MigrationSet {
    generation: SchemaGeneration,
    migrations: Vec<Box<dyn SchemaMigration>>,
}

/// Rendered SQL of one migration
#[derive(Debug, Clone, Serialize)]
pub struct PlannedMigration {
    pub version: String,
    pub statements: Vec<String>,
}

impl MigrationSet {
    pub fn new(generation: SchemaGeneration, migrations: Vec<Box<dyn SchemaMigration>>) -> Self {
        Self {
            generation,
            migrations,
        }
    }

    pub fn for_generation(generation: SchemaGeneration) -> Self {
        crate::migrations::for_generation(generation)
    }

    pub fn generation(&self) -> SchemaGeneration {
        self.generation
    }

    pub fn migrations(&self) -> &[Box<dyn SchemaMigration>] {
        &self.migrations
    }

    pub fn versions(&self) -> Vec<&str> {
        self.migrations.iter().map(|m| m.name()).collect()
    }

    pub fn get(&self, version: &str) -> Option<&dyn SchemaMigration> {
        self.migrations
            .iter()
            .find(|m| m.name() == version)
            .map(|m| m.as_ref())
    }

    pub fn contains(&self, version: &str) -> bool {
        self.get(version).is_some()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// SQL of the whole set in execution order; `Down` lists the last
    /// migration first
    pub fn plan_sql(
        &self,
        backend: DbBackend,
        direction: Direction,
    ) -> Result<Vec<PlannedMigration>, DbErr> {
        let render = |m: &Box<dyn SchemaMigration>| -> Result<PlannedMigration, DbErr> {
            Ok(PlannedMigration {
                version: m.name().to_string(),
                statements: m.plan(backend, direction)?.sql(),
            })
        };

        match direction {
            Direction::Up => self.migrations.iter().map(render).collect(),
            Direction::Down => self.migrations.iter().rev().map(render).collect(),
        }
    }
}

impl std::fmt::Debug for MigrationSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationSet")
            .field("generation", &self.generation)
            .field("versions", &self.versions())
            .finish()
    }
}

/// Errors raised while applying or reverting migrations
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error(
        "Database history contains versions unknown to the {generation} generation: {}",
        versions.join(", ")
    )]
    UnknownVersions {
        generation: SchemaGeneration,
        versions: Vec<String>,
    },

    #[error("Migration {version} changed after it was applied (recorded {recorded}, now {current})")]
    ChecksumMismatch {
        version: String,
        recorded: String,
        current: String,
    },

    #[error("Migration {version} failed and was rolled back: {source}")]
    StepFailed {
        version: String,
        #[source]
        source: DbErr,
        report: Box<MigrationReport>,
    },
}

impl MigrationError {
    /// Partial report of a run that stopped at a failing migration
    pub fn report(&self) -> Option<&MigrationReport> {
        match self {
            MigrationError::StepFailed { report, .. } => Some(report),
            _ => None,
        }
    }
}
