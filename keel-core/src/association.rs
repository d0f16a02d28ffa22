//! Typed polymorphic references
//!
//! The attachment tables (`EntityNotes`, `EntityLabels`, ...) point at their
//! owner through an untyped `(EntityType, EntityId)` pair. The database never
//! checks that pair, so every write goes through [`EntityRef`] and
//! [`Association::check`] instead.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, ParseError};
use crate::types::EntityKind;

/// A reference to one row of one entity table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: i32,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: i32) -> Self {
        Self { kind, id }
    }

    /// Rebuild a reference from the stored `(EntityType, EntityId)` columns
    pub fn from_stored(entity_type: &str, entity_id: i32) -> Result<Self, ParseError> {
        Ok(Self {
            kind: entity_type.parse()?,
            id: entity_id,
        })
    }

    /// Values for the `(EntityType, EntityId)` columns
    pub fn to_stored(&self) -> (&'static str, i32) {
        (self.kind.as_str(), self.id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// Polymorphic attachment tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Association {
    Notes,
    Comments,
    Labels,
    Documents,
    Images,
    Prices,
    Participants,
}

impl Association {
    pub fn table_name(&self) -> &'static str {
        match self {
            Association::Notes => "EntityNotes",
            Association::Comments => "EntityComments",
            Association::Labels => "EntityLabels",
            Association::Documents => "EntityDocuments",
            Association::Images => "EntityImages",
            Association::Prices => "EntityPrices",
            Association::Participants => "EntityParticipants",
        }
    }

    /// Whether rows of `kind` may own rows of this association
    pub fn accepts(&self, kind: EntityKind) -> bool {
        use EntityKind::*;

        match self {
            Association::Notes | Association::Comments => true,
            Association::Labels => matches!(
                kind,
                Organization | Person | Lead | Deal | Activity | Product | Project | ProjectTask
            ),
            Association::Documents => matches!(
                kind,
                Organization | Person | Lead | Deal | Product | Project | ProjectTask
            ),
            Association::Images => {
                matches!(kind, Organization | Person | Product | ProductCategory)
            }
            Association::Prices => matches!(kind, Product),
            Association::Participants => {
                matches!(kind, Activity | Deal | Project | SchedulerBooking)
            }
        }
    }

    /// Reject references this association cannot hold
    pub fn check(&self, target: &EntityRef) -> Result<(), CoreError> {
        if self.accepts(target.kind) {
            Ok(())
        } else {
            Err(CoreError::UnsupportedAttachment {
                association: self.table_name(),
                kind: target.kind,
            })
        }
    }

    pub fn all() -> &'static [Association] {
        &[
            Association::Notes,
            Association::Comments,
            Association::Labels,
            Association::Documents,
            Association::Images,
            Association::Prices,
            Association::Participants,
        ]
    }
}
