//! The table recording applied migrations

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Alias, ColumnDef, Expr, Iden, Index, Order, Query, Table};
use sea_orm::{ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::naming;

/// Default name of the history table
pub const DEFAULT_HISTORY_TABLE: &str = "__keel_migrations";

#[derive(Debug, Clone, Copy)]
enum History {
    Version,
    Checksum,
    AppliedAt,
    ExecutionMs,
}

impl Iden for History {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        let _ = write!(s, "{:?}", self);
    }
}

/// One row of the history table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMigration {
    pub version: String,
    pub checksum: String,
    pub applied_at: DateTime<Utc>,
    pub execution_ms: i64,
}

/// Access to a history table of a given name
#[derive(Debug, Clone)]
pub struct HistoryTable {
    name: String,
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_TABLE)
    }
}

impl HistoryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn table(&self) -> Alias {
        Alias::new(&self.name)
    }

    /// Create the table when it does not exist yet
    pub async fn ensure<C: ConnectionTrait>(&self, db: &C) -> Result<(), DbErr> {
        let backend = db.get_database_backend();
        let create = Table::create()
            .table(self.table())
            .if_not_exists()
            .col(ColumnDef::new(History::Version).string_len(150).not_null())
            .col(ColumnDef::new(History::Checksum).string_len(64).not_null())
            .col(
                ColumnDef::new(History::AppliedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(ColumnDef::new(History::ExecutionMs).big_integer().not_null())
            .primary_key(
                Index::create()
                    .name(naming::primary_key(&self.name))
                    .col(History::Version),
            )
            .to_owned();

        db.execute(backend.build(&create)).await?;
        debug!("History table {} is present", self.name);
        Ok(())
    }

    /// Applied migrations ordered by version
    pub async fn applied<C: ConnectionTrait>(&self, db: &C) -> Result<Vec<AppliedMigration>, DbErr> {
        let backend = db.get_database_backend();
        let select = Query::select()
            .columns([
                History::Version,
                History::Checksum,
                History::AppliedAt,
                History::ExecutionMs,
            ])
            .from(self.table())
            .order_by(History::Version, Order::Asc)
            .to_owned();

        let rows = db.query_all(backend.build(&select)).await?;
        rows.into_iter()
            .map(|row| {
                Ok(AppliedMigration {
                    version: row.try_get("", "Version")?,
                    checksum: row.try_get("", "Checksum")?,
                    applied_at: row.try_get("", "AppliedAt")?,
                    execution_ms: row.try_get("", "ExecutionMs")?,
                })
            })
            .collect()
    }

    pub async fn contains<C: ConnectionTrait>(&self, db: &C, version: &str) -> Result<bool, DbErr> {
        let backend = db.get_database_backend();
        let select = Query::select()
            .column(History::Version)
            .from(self.table())
            .and_where(Expr::col(History::Version).eq(version))
            .to_owned();

        Ok(db.query_one(backend.build(&select)).await?.is_some())
    }

    pub async fn record<C: ConnectionTrait>(
        &self,
        db: &C,
        version: &str,
        checksum: &str,
        execution_ms: i64,
    ) -> Result<(), DbErr> {
        let backend = db.get_database_backend();
        let insert = Query::insert()
            .into_table(self.table())
            .columns([
                History::Version,
                History::Checksum,
                History::AppliedAt,
                History::ExecutionMs,
            ])
            .values([
                version.into(),
                checksum.into(),
                Utc::now().into(),
                execution_ms.into(),
            ])
            .map_err(|e| DbErr::Custom(e.to_string()))?
            .to_owned();

        db.execute(backend.build(&insert)).await?;
        Ok(())
    }

    pub async fn remove<C: ConnectionTrait>(&self, db: &C, version: &str) -> Result<(), DbErr> {
        let backend = db.get_database_backend();
        let delete = Query::delete()
            .from_table(self.table())
            .and_where(Expr::col(History::Version).eq(version))
            .to_owned();

        db.execute(backend.build(&delete)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectOptions, Database, DatabaseConnection};

    async fn memory_db() -> DatabaseConnection {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).min_connections(1);
        Database::connect(opts).await.unwrap()
    }

    #[tokio::test]
    async fn test_record_and_remove() {
        let db = memory_db().await;
        let history = HistoryTable::new("__test_history");

        history.ensure(&db).await.unwrap();
        // A second call finds the table in place
        history.ensure(&db).await.unwrap();

        history.record(&db, "m2_second", "bb", 7).await.unwrap();
        history.record(&db, "m1_first", "aa", 3).await.unwrap();

        let applied = history.applied(&db).await.unwrap();
        let versions: Vec<_> = applied.iter().map(|a| a.version.as_str()).collect();
        assert_eq!(versions, vec!["m1_first", "m2_second"]);
        assert_eq!(applied[0].checksum, "aa");
        assert_eq!(applied[0].execution_ms, 3);

        assert!(history.contains(&db, "m2_second").await.unwrap());
        history.remove(&db, "m2_second").await.unwrap();
        assert!(!history.contains(&db, "m2_second").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_version_is_rejected() {
        let db = memory_db().await;
        let history = HistoryTable::default();
        history.ensure(&db).await.unwrap();

        history.record(&db, "m1_first", "aa", 1).await.unwrap();
        assert!(history.record(&db, "m1_first", "aa", 1).await.is_err());
    }
}
