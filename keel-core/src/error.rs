//! Core error types for Keel

use thiserror::Error;

use crate::lifecycle::EntityStatus;
use crate::types::EntityKind;

/// Core error type for domain rule violations
#[derive(Debug, Error)]
pub enum CoreError {
    /// Lifecycle transition errors
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Hierarchy (parent link / chain) errors
    #[error("Hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),

    /// Parsing of stored discriminators
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A polymorphic reference names a kind the association does not accept
    #[error("{association} cannot be attached to {kind}")]
    UnsupportedAttachment {
        association: &'static str,
        kind: EntityKind,
    },
}

/// Result type alias for Keel domain operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Lifecycle transition errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Row is already {0}")]
    AlreadyInStatus(EntityStatus),

    #[error("Row is deleted; restore it first")]
    Deleted,

    #[error("Row is not deleted")]
    NotDeleted,

    #[error("Cannot {action} a row that is {status}")]
    InvalidTransition {
        action: &'static str,
        status: EntityStatus,
    },
}

/// Hierarchy errors for parent links and reschedule chains
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("Node {0} cannot be its own parent")]
    SelfParent(i32),

    #[error("Setting parent of {node} to {parent} would create a cycle")]
    Cycle { node: i32, parent: i32 },

    #[error("Parent {0} does not exist")]
    MissingParent(i32),

    #[error("Hierarchy depth {depth} exceeds the limit of {limit}")]
    TooDeep { depth: usize, limit: usize },

    #[error("Chain link {from} -> {to} is not mirrored by {to} -> {from}")]
    BrokenLink { from: i32, to: i32 },
}

/// Errors for parsing stored discriminator strings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid entity type: '{0}'")]
    InvalidEntityKind(String),

    #[error("Invalid entity status: '{0}'. Supported statuses are: Active, Suspended")]
    InvalidEntityStatus(String),

    #[error("Invalid system role: '{0}'. Supported roles are: SuperAdmin, TenantAdmin, NonTenantAdmin")]
    InvalidSystemRole(String),

    #[error("Invalid billing interval: '{0}'")]
    InvalidBillingInterval(String),

    #[error("Invalid schema generation: '{0}'. Supported generations are: legacy, current")]
    InvalidSchemaGeneration(String),
}
