//! Testing utilities for keel-storage
//!
//! Requires the `testing` feature:
//!
//! ```toml
//! [dev-dependencies]
//! keel-storage = { features = ["testing"] }
//! ```
//!
//! - `TestDatabase` - an isolated SQLite database in a temporary directory,
//!   empty or migrated to a schema generation

pub mod database;

pub use database::{TestDatabase, TestDatabaseError};
