//! Row lifecycle: suspend / resume and soft delete
//!
//! Suspension and soft deletion are independent flags on the same row.
//! A deleted row keeps its status so that restoring it brings it back in the
//! state it was deleted in. Only active, non-deleted rows accept new child
//! rows; physical removal happens solely through cascading deletes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LifecycleError, ParseError};

/// Value of the `EntityStatus` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EntityStatus {
    #[default]
    Active,
    Suspended,
}

impl EntityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Active => "Active",
            EntityStatus::Suspended => "Suspended",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(EntityStatus::Active),
            "Suspended" => Ok(EntityStatus::Suspended),
            _ => Err(ParseError::InvalidEntityStatus(s.to_string())),
        }
    }
}

/// Lifecycle columns of one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Lifecycle {
    pub status: EntityStatus,
    pub suspended_at: Option<DateTime<Utc>>,
    pub resumed_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<i32>,
}

impl Lifecycle {
    /// A freshly inserted row: active and not deleted
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suspend(&mut self, at: DateTime<Utc>) -> Result<(), LifecycleError> {
        if self.is_deleted {
            return Err(LifecycleError::Deleted);
        }
        if self.status == EntityStatus::Suspended {
            return Err(LifecycleError::AlreadyInStatus(EntityStatus::Suspended));
        }
        self.status = EntityStatus::Suspended;
        self.suspended_at = Some(at);
        Ok(())
    }

    /// Reactivate a suspended row. `SuspendedAt` is kept as history.
    pub fn resume(&mut self, at: DateTime<Utc>) -> Result<(), LifecycleError> {
        if self.is_deleted {
            return Err(LifecycleError::Deleted);
        }
        if self.status != EntityStatus::Suspended {
            return Err(LifecycleError::InvalidTransition {
                action: "resume",
                status: self.status,
            });
        }
        self.status = EntityStatus::Active;
        self.resumed_at = Some(at);
        Ok(())
    }

    pub fn soft_delete(&mut self, at: DateTime<Utc>, by: Option<i32>) -> Result<(), LifecycleError> {
        if self.is_deleted {
            return Err(LifecycleError::Deleted);
        }
        self.is_deleted = true;
        self.deleted_at = Some(at);
        self.deleted_by = by;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<(), LifecycleError> {
        if !self.is_deleted {
            return Err(LifecycleError::NotDeleted);
        }
        self.is_deleted = false;
        self.deleted_at = None;
        self.deleted_by = None;
        Ok(())
    }

    /// Whether new child rows (or attachments) may reference this row
    pub fn accepts_new_children(&self) -> bool {
        !self.is_deleted && self.status == EntityStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_suspend_and_resume() {
        let t0 = Utc::now();
        let t1 = t0 + Duration::minutes(5);
        let mut lifecycle = Lifecycle::new();

        lifecycle.suspend(t0).unwrap();
        assert_eq!(lifecycle.status, EntityStatus::Suspended);
        assert_eq!(lifecycle.suspended_at, Some(t0));
        assert!(!lifecycle.accepts_new_children());

        lifecycle.resume(t1).unwrap();
        assert_eq!(lifecycle.status, EntityStatus::Active);
        assert_eq!(lifecycle.suspended_at, Some(t0));
        assert_eq!(lifecycle.resumed_at, Some(t1));
        assert!(lifecycle.accepts_new_children());
    }

    #[test]
    fn test_invalid_transitions() {
        let now = Utc::now();
        let mut lifecycle = Lifecycle::new();

        assert_eq!(
            lifecycle.resume(now),
            Err(LifecycleError::InvalidTransition { action: "resume", status: EntityStatus::Active })
        );

        lifecycle.suspend(now).unwrap();
        assert_eq!(
            lifecycle.suspend(now),
            Err(LifecycleError::AlreadyInStatus(EntityStatus::Suspended))
        );
    }

    #[test]
    fn test_deleted_rows_are_frozen_until_restored() {
        let now = Utc::now();
        let mut lifecycle = Lifecycle::new();
        lifecycle.suspend(now).unwrap();
        lifecycle.soft_delete(now, Some(3)).unwrap();

        assert_eq!(lifecycle.resume(now), Err(LifecycleError::Deleted));
        assert_eq!(lifecycle.soft_delete(now, None), Err(LifecycleError::Deleted));
        assert!(!lifecycle.accepts_new_children());

        lifecycle.restore().unwrap();
        assert!(!lifecycle.is_deleted);
        assert_eq!(lifecycle.deleted_by, None);
        // Status survives the delete/restore cycle
        assert_eq!(lifecycle.status, EntityStatus::Suspended);

        assert_eq!(lifecycle.restore(), Err(LifecycleError::NotDeleted));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Suspended".parse::<EntityStatus>().unwrap(), EntityStatus::Suspended);
        assert!("suspended".parse::<EntityStatus>().is_err());
        assert_eq!(EntityStatus::default().to_string(), "Active");
    }
}
