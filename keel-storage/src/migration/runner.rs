use std::time::Instant;

use sea_orm::{
    ConnectionTrait, DatabaseConnection as SeaConnection, DatabaseTransaction, DbBackend, DbErr,
    TransactionTrait,
};
use tracing::{debug, error, info, warn};

use super::history::{AppliedMigration, HistoryTable};
use super::report::{
    MigrationReport, MigrationStatus, RefreshReport, StatusEntry, StepOutcome, VerifyReport,
};
use super::{lock, Direction, MigrationError, MigrationPlan, MigrationSet, PlannedMigration, SchemaMigration};
use crate::connection::DatabaseConnection;

/// Applies and reverts one [`MigrationSet`] against a database
pub struct MigrationRunner {
    db: SeaConnection,
    set: MigrationSet,
    history: HistoryTable,
    validate_checksums: bool,
}

impl MigrationRunner {
    pub fn new(db: SeaConnection, set: MigrationSet) -> Self {
        Self {
            db,
            set,
            history: HistoryTable::default(),
            validate_checksums: true,
        }
    }

    /// Runner for the generation and history table named in the connection's config
    pub fn from_config(connection: &DatabaseConnection) -> Self {
        let config = &connection.get_config().migrations;
        Self::new(
            connection.get_connection().clone(),
            MigrationSet::for_generation(config.generation),
        )
        .with_table_name(config.table_name.clone())
        .validate_checksums(config.validate_checksums)
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.history = HistoryTable::new(table_name);
        self
    }

    pub fn validate_checksums(mut self, enabled: bool) -> Self {
        self.validate_checksums = enabled;
        self
    }

    pub fn backend(&self) -> DbBackend {
        self.db.get_database_backend()
    }

    pub fn migration_set(&self) -> &MigrationSet {
        &self.set
    }

    pub fn history_table(&self) -> &HistoryTable {
        &self.history
    }

    pub fn connection(&self) -> &SeaConnection {
        &self.db
    }

    /// Known migrations with their recorded state, plus unknown applied versions
    pub async fn status(&self) -> Result<MigrationStatus, MigrationError> {
        let applied = self.load_history().await?;
        self.build_status(&applied)
    }

    /// Apply pending migrations in order, all of them or the next `steps`
    pub async fn up(&self, steps: Option<usize>) -> Result<MigrationReport, MigrationError> {
        let applied = self.load_history().await?;
        let status = self.build_status(&applied)?;
        self.ensure_known(&status)?;

        if self.validate_checksums {
            if let Some(entry) = status.migrations.iter().find(|e| e.is_drifted()) {
                return Err(MigrationError::ChecksumMismatch {
                    version: entry.version.clone(),
                    recorded: entry.recorded_checksum.clone().unwrap_or_default(),
                    current: entry.current_checksum.clone(),
                });
            }
        }

        let mut pending: Vec<&dyn SchemaMigration> = self
            .set
            .migrations()
            .iter()
            .filter(|m| !is_recorded(&applied, m.name()))
            .map(|m| m.as_ref())
            .collect();
        if let Some(steps) = steps {
            pending.truncate(steps);
        }

        self.run(Direction::Up, pending).await
    }

    /// Revert the last `steps` applied migrations, newest first
    pub async fn down(&self, steps: usize) -> Result<MigrationReport, MigrationError> {
        let applied = self.load_history().await?;
        let status = self.build_status(&applied)?;
        self.ensure_known(&status)?;

        let targets: Vec<&dyn SchemaMigration> = self
            .set
            .migrations()
            .iter()
            .rev()
            .filter(|m| is_recorded(&applied, m.name()))
            .take(steps)
            .map(|m| m.as_ref())
            .collect();

        self.run(Direction::Down, targets).await
    }

    /// Revert every applied migration
    pub async fn reset(&self) -> Result<MigrationReport, MigrationError> {
        self.down(self.set.len()).await
    }

    /// Revert everything, then apply everything
    pub async fn refresh(&self) -> Result<RefreshReport, MigrationError> {
        let reverted = self.reset().await?;
        let applied = self.up(None).await?;
        Ok(RefreshReport { reverted, applied })
    }

    pub async fn verify(&self) -> Result<VerifyReport, MigrationError> {
        let applied = self.load_history().await?;
        let status = self.build_status(&applied)?;

        let report = VerifyReport {
            pending: status.pending().into_iter().map(str::to_string).collect(),
            drifted: status
                .migrations
                .iter()
                .filter(|e| e.is_drifted())
                .map(|e| e.version.clone())
                .collect(),
            unknown: status.unknown,
        };

        if report.is_clean() {
            info!("Schema is up to date with the {} generation", self.set.generation());
        } else {
            warn!(
                "Schema differs from the {} generation: {} pending, {} unknown, {} drifted",
                self.set.generation(),
                report.pending.len(),
                report.unknown.len(),
                report.drifted.len()
            );
        }
        Ok(report)
    }

    /// SQL of every migration for this runner's backend, without touching the database
    pub fn plan_sql(&self, direction: Direction) -> Result<Vec<PlannedMigration>, DbErr> {
        self.set.plan_sql(self.backend(), direction)
    }

    async fn load_history(&self) -> Result<Vec<AppliedMigration>, MigrationError> {
        if self.backend() == DbBackend::Postgres {
            let txn = self.db.begin().await?;
            lock::acquire(&txn, self.history.name()).await?;
            self.history.ensure(&txn).await?;
            txn.commit().await?;
        } else {
            // Own statement so a missing table is created under the busy timeout
            self.history.ensure(&self.db).await?;
        }

        Ok(self.history.applied(&self.db).await?)
    }

    fn build_status(&self, applied: &[AppliedMigration]) -> Result<MigrationStatus, MigrationError> {
        let backend = self.backend();
        let migrations = self
            .set
            .migrations()
            .iter()
            .map(|m| {
                let record = applied.iter().find(|a| a.version == m.name());
                Ok(StatusEntry {
                    version: m.name().to_string(),
                    applied_at: record.map(|r| r.applied_at),
                    recorded_checksum: record.map(|r| r.checksum.clone()),
                    current_checksum: m.checksum(backend)?,
                })
            })
            .collect::<Result<Vec<_>, DbErr>>()?;

        let unknown = applied
            .iter()
            .filter(|a| !self.set.contains(&a.version))
            .map(|a| a.version.clone())
            .collect();

        Ok(MigrationStatus { migrations, unknown })
    }

    fn ensure_known(&self, status: &MigrationStatus) -> Result<(), MigrationError> {
        if status.unknown.is_empty() {
            return Ok(());
        }
        Err(MigrationError::UnknownVersions {
            generation: self.set.generation(),
            versions: status.unknown.clone(),
        })
    }

    async fn run(
        &self,
        direction: Direction,
        steps: Vec<&dyn SchemaMigration>,
    ) -> Result<MigrationReport, MigrationError> {
        let started = Instant::now();
        let mut report = MigrationReport::new(direction);

        if steps.is_empty() {
            info!("Nothing to run ({})", direction);
            return Ok(report);
        }
        info!("Running {} migration(s) {}", steps.len(), direction);

        for (index, migration) in steps.iter().enumerate() {
            let version = migration.name();
            match self.run_step(*migration, direction).await {
                Ok(Some(duration_ms)) => {
                    info!("Migrated {} {} ({} ms)", direction, version, duration_ms);
                    report.completed.push(StepOutcome {
                        version: version.to_string(),
                        duration_ms,
                    });
                }
                Ok(None) => {
                    debug!("{} was handled by another runner", version);
                    report.skipped.push(version.to_string());
                }
                Err(source) => {
                    error!("Migration {} failed ({}): {}", version, direction, source);
                    report.failed = Some(version.to_string());
                    report.not_attempted = steps[index + 1..]
                        .iter()
                        .map(|m| m.name().to_string())
                        .collect();
                    report.total_duration_ms = elapsed_ms(started);
                    return Err(MigrationError::StepFailed {
                        version: version.to_string(),
                        source,
                        report: Box::new(report),
                    });
                }
            }
        }

        report.total_duration_ms = elapsed_ms(started);
        Ok(report)
    }

    /// One migration in its own transaction. `None` when the history shows
    /// the step is no longer needed.
    async fn run_step(
        &self,
        migration: &dyn SchemaMigration,
        direction: Direction,
    ) -> Result<Option<i64>, DbErr> {
        let plan = migration.plan(self.backend(), direction)?;
        let txn = self.db.begin().await?;

        match self.apply(&txn, migration.name(), &plan, direction).await {
            Ok(Some(duration_ms)) => {
                txn.commit().await?;
                Ok(Some(duration_ms))
            }
            Ok(None) => {
                txn.rollback().await?;
                Ok(None)
            }
            Err(e) => {
                if let Err(rollback_error) = txn.rollback().await {
                    warn!("Rollback of {} failed: {}", migration.name(), rollback_error);
                }
                Err(e)
            }
        }
    }

    async fn apply(
        &self,
        txn: &DatabaseTransaction,
        version: &str,
        plan: &MigrationPlan,
        direction: Direction,
    ) -> Result<Option<i64>, DbErr> {
        lock::acquire(txn, self.history.name()).await?;

        // Another runner may have finished this step while we waited
        let recorded = self.history.contains(txn, version).await?;
        let needed = match direction {
            Direction::Up => !recorded,
            Direction::Down => recorded,
        };
        if !needed {
            return Ok(None);
        }

        let started = Instant::now();
        for statement in plan.statements() {
            debug!("{}: {}", version, statement);
            txn.execute(statement.clone()).await?;
        }
        let duration_ms = elapsed_ms(started);

        match direction {
            Direction::Up => {
                self.history
                    .record(txn, version, &plan.checksum(), duration_ms)
                    .await?
            }
            Direction::Down => self.history.remove(txn, version).await?,
        }
        Ok(Some(duration_ms))
    }
}

fn is_recorded(applied: &[AppliedMigration], version: &str) -> bool {
    applied.iter().any(|a| a.version == version)
}

fn elapsed_ms(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}
