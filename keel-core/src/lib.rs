//! Core domain vocabulary for Keel
//!
//! This crate holds the rules the relational schema cannot express on its own:
//! typed polymorphic references, the lifecycle of soft-deletable and
//! suspendable rows, and cycle prevention for self-referencing hierarchies.
//! It has no database dependency; `keel-storage` applies these rules against
//! live rows.

pub mod association;
pub mod error;
pub mod hierarchy;
pub mod lifecycle;
pub mod types;

// Re-export commonly used types at the crate root
pub use association::{Association, EntityRef};
pub use error::{CoreError, HierarchyError, LifecycleError, ParseError, Result};
pub use lifecycle::{EntityStatus, Lifecycle};
pub use types::{BillingInterval, EntityKind, SchemaGeneration, SystemRole};
