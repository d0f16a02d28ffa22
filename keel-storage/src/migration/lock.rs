//! Serialisation of concurrent migration runs

use sea_orm::sea_query::{Alias, Expr, Query};
use sea_orm::{ConnectionTrait, DbBackend, DbErr, Statement};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Advisory lock key for a history table
pub fn advisory_key(history_table: &str) -> i64 {
    let digest = Sha256::digest(history_table.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    i64::from_be_bytes(bytes)
}

/// Take the migration lock for the rest of the current transaction.
///
/// PostgreSQL uses a transaction-scoped advisory lock, released on commit
/// or rollback. SQLite admits one writer at a time, so the lock is a no-op
/// write on the history table. It must be the first statement of the
/// transaction: a transaction that has already read cannot wait for the
/// write lock and fails with `database is locked` instead.
pub async fn acquire<C: ConnectionTrait>(db: &C, history_table: &str) -> Result<(), DbErr> {
    match db.get_database_backend() {
        DbBackend::Postgres => {
            let key = advisory_key(history_table);
            debug!("Waiting for migration lock {}", key);
            db.execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "SELECT pg_advisory_xact_lock($1)",
                [key.into()],
            ))
            .await?;
            debug!("Acquired migration lock {}", key);
        }
        DbBackend::Sqlite => {
            let claim = Query::delete()
                .from_table(Alias::new(history_table))
                .and_where(Expr::cust("1 = 0"))
                .to_owned();
            debug!("Waiting for write lock on {}", history_table);
            db.execute(DbBackend::Sqlite.build(&claim)).await?;
            debug!("Acquired write lock on {}", history_table);
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_depends_on_table() {
        assert_eq!(advisory_key("__keel_migrations"), advisory_key("__keel_migrations"));
        assert_ne!(advisory_key("__keel_migrations"), advisory_key("__other_migrations"));
    }
}
