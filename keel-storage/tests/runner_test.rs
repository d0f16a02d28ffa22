//! End-to-end behaviour of the migration runner on SQLite

use keel_config::DatabaseConfig;
use keel_core::SchemaGeneration;
use keel_storage::testing::TestDatabase;
use keel_storage::{DatabaseConnection, MigrationError, MigrationPlan, MigrationRunner, MigrationSet, SchemaMigration};
use sea_orm_migration::prelude::*;

const CURRENT_VERSIONS: usize = 8;

async fn empty() -> TestDatabase {
    TestDatabase::with_generation(SchemaGeneration::Current).await.unwrap()
}

#[tokio::test]
async fn test_up_reset_up_reproduces_schema() {
    let db = empty().await;
    let runner = db.runner(SchemaGeneration::Current);

    let report = runner.up(None).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.completed.len(), CURRENT_VERSIONS);
    let first = db.snapshot().await.unwrap();
    assert!(first.table("Tenants").is_some());
    assert!(first.dangling_foreign_keys().is_empty());

    let reverted = runner.reset().await.unwrap();
    assert_eq!(reverted.completed.len(), CURRENT_VERSIONS);
    assert!(db.snapshot().await.unwrap().is_empty());

    runner.up(None).await.unwrap();
    let second = db.snapshot().await.unwrap();
    assert_eq!(first, second);

    // Seeds come back with the tables
    assert_eq!(db.count("AspNetRoles").await.unwrap(), 3);
    assert_eq!(db.count("SubscriptionPlans").await.unwrap(), 7);
}

#[tokio::test]
async fn test_every_down_step_leaves_consistent_schema() {
    let db = TestDatabase::migrated(SchemaGeneration::Current).await.unwrap();
    let runner = db.runner(SchemaGeneration::Current);

    for remaining in (0..CURRENT_VERSIONS).rev() {
        let report = runner.down(1).await.unwrap();
        assert_eq!(report.completed.len(), 1);

        let snapshot = db.snapshot().await.unwrap();
        assert!(
            snapshot.dangling_foreign_keys().is_empty(),
            "dangling keys with {} migrations applied: {:?}",
            remaining,
            snapshot.dangling_foreign_keys()
        );
        assert_eq!(runner.status().await.unwrap().applied().len(), remaining);
    }

    assert!(db.snapshot().await.unwrap().is_empty());
    // Nothing left to revert
    assert!(runner.down(1).await.unwrap().completed.is_empty());
}

#[tokio::test]
async fn test_status_after_partial_up() {
    let db = empty().await;
    let runner = db.runner(SchemaGeneration::Current);

    let report = runner.up(Some(3)).await.unwrap();
    assert_eq!(
        report.versions(),
        vec![
            "m20251005_000001_identity",
            "m20251005_000002_tenancy",
            "m20251005_000003_crm"
        ]
    );

    let status = runner.status().await.unwrap();
    assert_eq!(status.applied().len(), 3);
    assert_eq!(status.pending().len(), 5);
    assert_eq!(status.pending()[0], "m20251005_000004_catalog");
    assert!(status.unknown.is_empty());
    assert!(status.migrations.iter().all(|entry| !entry.is_drifted()));

    let verify = runner.verify().await.unwrap();
    assert!(!verify.is_clean());
    assert_eq!(verify.pending.len(), 5);

    runner.up(None).await.unwrap();
    assert!(runner.verify().await.unwrap().is_clean());
}

#[tokio::test]
async fn test_refresh_rebuilds_data() {
    let db = TestDatabase::migrated(SchemaGeneration::Current).await.unwrap();
    db.execute("INSERT INTO \"Tenants\" (\"Name\", \"Slug\") VALUES ('Acme', 'acme')")
        .await
        .unwrap();

    let report = db.runner(SchemaGeneration::Current).refresh().await.unwrap();
    assert_eq!(report.reverted.completed.len(), CURRENT_VERSIONS);
    assert_eq!(report.applied.completed.len(), CURRENT_VERSIONS);

    assert_eq!(db.count("Tenants").await.unwrap(), 0);
    assert_eq!(db.count("AspNetRoles").await.unwrap(), 3);
}

#[tokio::test]
async fn test_unknown_versions_block_other_generation() {
    let db = TestDatabase::migrated(SchemaGeneration::Legacy).await.unwrap();
    let before = db.snapshot().await.unwrap();
    assert!(before.table("TodoItems").is_some());

    let err = db.runner(SchemaGeneration::Current).up(None).await.unwrap_err();
    match err {
        MigrationError::UnknownVersions { generation, versions } => {
            assert_eq!(generation, SchemaGeneration::Current);
            assert_eq!(versions, vec!["m20250729_000001_initial_create".to_string()]);
        }
        other => panic!("unexpected error: {}", other),
    }

    assert_eq!(db.snapshot().await.unwrap(), before);
    assert!(db.runner(SchemaGeneration::Current).down(1).await.is_err());
}

#[tokio::test]
async fn test_checksum_drift() {
    let db = empty().await;
    let runner = db.runner(SchemaGeneration::Current);
    runner.up(Some(2)).await.unwrap();

    db.execute(
        "UPDATE \"__keel_migrations\" SET \"Checksum\" = 'tampered' \
         WHERE \"Version\" = 'm20251005_000002_tenancy'",
    )
    .await
    .unwrap();

    let err = runner.up(None).await.unwrap_err();
    assert!(matches!(
        err,
        MigrationError::ChecksumMismatch { ref version, ref recorded, .. }
            if version == "m20251005_000002_tenancy" && recorded == "tampered"
    ));
    assert_eq!(runner.status().await.unwrap().applied().len(), 2);

    let verify = runner.verify().await.unwrap();
    assert_eq!(verify.drifted, vec!["m20251005_000002_tenancy".to_string()]);

    let lenient = db.runner(SchemaGeneration::Current).validate_checksums(false);
    let report = lenient.up(None).await.unwrap();
    assert_eq!(report.completed.len(), CURRENT_VERSIONS - 2);
}

#[tokio::test]
async fn test_custom_history_table() {
    let db = empty().await;
    let runner = db
        .runner(SchemaGeneration::Current)
        .with_table_name("schema_history");
    runner.up(Some(1)).await.unwrap();

    assert_eq!(db.count("schema_history").await.unwrap(), 1);
    assert_eq!(runner.history_table().name(), "schema_history");
}

// A small set with a failing middle step

fn create(name: &str) -> TableCreateStatement {
    Table::create()
        .table(Alias::new(name))
        .col(ColumnDef::new(Alias::new("Id")).integer().not_null().primary_key())
        .to_owned()
}

struct Good;

impl MigrationName for Good {
    fn name(&self) -> &str {
        "m20990101_000001_good"
    }
}

impl SchemaMigration for Good {
    fn up(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        plan.push(&create("Alpha"));
        Ok(())
    }

    fn down(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        plan.drop_table(Alias::new("Alpha"));
        Ok(())
    }
}

struct Broken;

impl MigrationName for Broken {
    fn name(&self) -> &str {
        "m20990101_000002_broken"
    }
}

impl SchemaMigration for Broken {
    fn up(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        plan.push(&create("Half")).push(&create("Alpha"));
        Ok(())
    }

    fn down(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        plan.drop_table(Alias::new("Half"));
        Ok(())
    }
}

struct Later;

impl MigrationName for Later {
    fn name(&self) -> &str {
        "m20990101_000003_later"
    }
}

impl SchemaMigration for Later {
    fn up(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        plan.push(&create("Omega"));
        Ok(())
    }

    fn down(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        plan.drop_table(Alias::new("Omega"));
        Ok(())
    }
}

#[tokio::test]
async fn test_failed_step_rolls_back_and_stops() {
    let db = empty().await;
    let migrations: Vec<Box<dyn SchemaMigration>> = vec![Box::new(Good), Box::new(Broken), Box::new(Later)];
    let runner = MigrationRunner::new(db.db().clone(), MigrationSet::new(SchemaGeneration::Current, migrations));

    let err = runner.up(None).await.unwrap_err();
    let report = err.report().expect("failed runs carry a report").clone();
    assert!(matches!(err, MigrationError::StepFailed { ref version, .. } if version == "m20990101_000002_broken"));

    assert_eq!(report.versions(), vec!["m20990101_000001_good"]);
    assert_eq!(report.failed.as_deref(), Some("m20990101_000002_broken"));
    assert_eq!(report.not_attempted, vec!["m20990101_000003_later".to_string()]);
    assert!(!report.is_success());

    let snapshot = db.snapshot().await.unwrap();
    assert_eq!(snapshot.table_names(), vec!["Alpha"]);

    let status = runner.status().await.unwrap();
    assert_eq!(status.applied(), vec!["m20990101_000001_good"]);
    assert_eq!(
        status.pending(),
        vec!["m20990101_000002_broken", "m20990101_000003_later"]
    );
}

async fn file_runner(url: &str) -> MigrationRunner {
    let connection = DatabaseConnection::new(DatabaseConfig {
        url: url.to_string(),
        max_connections: 1,
        min_connections: 1,
        ..DatabaseConfig::default()
    })
    .await
    .unwrap();
    MigrationRunner::from_config(&connection)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_runners_take_turns() {
    let dir = tempfile::tempdir().unwrap();

    for round in 0..3 {
        let path = dir.path().join(format!("shared-{}.db", round));
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let first = file_runner(&url).await;
        let second = file_runner(&url).await;

        let (a, b) = tokio::join!(first.up(None), second.up(None));
        let a = a.unwrap_or_else(|e| panic!("round {}: first runner failed: {}", round, e));
        let b = b.unwrap_or_else(|e| panic!("round {}: second runner failed: {}", round, e));

        // Every step ran exactly once; the other runner saw it recorded
        assert_eq!(a.completed.len() + b.completed.len(), CURRENT_VERSIONS);
        assert_eq!(a.completed.len() + a.skipped.len(), CURRENT_VERSIONS);
        assert_eq!(b.completed.len() + b.skipped.len(), CURRENT_VERSIONS);

        let status = first.status().await.unwrap();
        assert_eq!(status.applied().len(), CURRENT_VERSIONS);
        assert!(status.pending().is_empty());
    }
}
