//! Schema definitions and migration machinery for Keel
//!
//! The relational schema is described as ordered [`migration::SchemaMigration`]s
//! grouped into generations ([`migrations`]). [`migration::MigrationRunner`]
//! applies and reverts them transactionally against PostgreSQL or SQLite and
//! records every step in a history table. [`inspect::SchemaInspector`] reads a
//! live schema back for comparison, and [`integrity`] enforces the rules the
//! database cannot express on its own.

pub mod connection;
pub mod error;
pub mod inspect;
pub mod integrity;
pub mod migration;
pub mod migrations;
pub mod schema;
pub mod seed;

#[cfg(feature = "testing")]
pub mod testing;

// Re-export core types for convenience
pub use connection::DatabaseConnection;
pub use error::{StorageError, StorageResult};
pub use inspect::{SchemaInspector, SchemaSnapshot};
pub use integrity::{EntityResolver, HierarchyGuard};
pub use migration::{
    Direction, MigrationError, MigrationPlan, MigrationReport, MigrationRunner, MigrationSet,
    SchemaMigration,
};
