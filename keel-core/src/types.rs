//! Core type definitions for Keel

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Fixed system roles seeded into the roles table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemRole {
    SuperAdmin,
    TenantAdmin,
    NonTenantAdmin,
}

impl SystemRole {
    /// Role name as stored in `AspNetRoles.Name`
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemRole::SuperAdmin => "SuperAdmin",
            SystemRole::TenantAdmin => "TenantAdmin",
            SystemRole::NonTenantAdmin => "NonTenantAdmin",
        }
    }

    /// Upper-cased name used for case-insensitive lookups
    pub fn normalized_name(&self) -> String {
        self.as_str().to_uppercase()
    }

    pub fn description(&self) -> &'static str {
        match self {
            SystemRole::SuperAdmin => "Platform operator with access to every tenant",
            SystemRole::TenantAdmin => "Administrator of a single tenant",
            SystemRole::NonTenantAdmin => "Platform user not bound to a tenant",
        }
    }

    /// All system roles in seed order
    pub fn all() -> &'static [SystemRole] {
        &[
            SystemRole::SuperAdmin,
            SystemRole::TenantAdmin,
            SystemRole::NonTenantAdmin,
        ]
    }
}

impl fmt::Display for SystemRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SystemRole {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SystemRole::all()
            .iter()
            .copied()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::InvalidSystemRole(s.to_string()))
    }
}

/// Entities a polymorphic association row may point at.
///
/// The stored `EntityType` discriminator is the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Organization,
    Person,
    Lead,
    Deal,
    Pipeline,
    Activity,
    Product,
    ProductCategory,
    Scheduler,
    SchedulerBooking,
    Sequence,
    Project,
    ProjectTask,
}

impl EntityKind {
    /// Discriminator stored in `EntityType` columns
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Organization => "Organization",
            EntityKind::Person => "Person",
            EntityKind::Lead => "Lead",
            EntityKind::Deal => "Deal",
            EntityKind::Pipeline => "Pipeline",
            EntityKind::Activity => "Activity",
            EntityKind::Product => "Product",
            EntityKind::ProductCategory => "ProductCategory",
            EntityKind::Scheduler => "Scheduler",
            EntityKind::SchedulerBooking => "SchedulerBooking",
            EntityKind::Sequence => "Sequence",
            EntityKind::Project => "Project",
            EntityKind::ProjectTask => "ProjectTask",
        }
    }

    /// Table holding rows of this kind
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Organization => "Organizations",
            EntityKind::Person => "People",
            EntityKind::Lead => "Leads",
            EntityKind::Deal => "Deals",
            EntityKind::Pipeline => "Pipelines",
            EntityKind::Activity => "Activities",
            EntityKind::Product => "Products",
            EntityKind::ProductCategory => "ProductCategories",
            EntityKind::Scheduler => "Schedulers",
            EntityKind::SchedulerBooking => "SchedulerBookings",
            EntityKind::Sequence => "Sequences",
            EntityKind::Project => "Projects",
            EntityKind::ProjectTask => "ProjectTasks",
        }
    }

    /// Whether the table carries `IsDeleted` / `DeletedAt` / `DeletedBy`
    pub fn is_soft_deletable(&self) -> bool {
        !matches!(self, EntityKind::SchedulerBooking)
    }

    /// Whether the table carries `EntityStatus` / `SuspendedAt` / `ResumedAt`
    pub fn has_lifecycle(&self) -> bool {
        matches!(
            self,
            EntityKind::Organization
                | EntityKind::Person
                | EntityKind::Lead
                | EntityKind::Deal
                | EntityKind::Pipeline
                | EntityKind::Product
                | EntityKind::Scheduler
                | EntityKind::Sequence
                | EntityKind::Project
        )
    }

    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Organization,
            EntityKind::Person,
            EntityKind::Lead,
            EntityKind::Deal,
            EntityKind::Pipeline,
            EntityKind::Activity,
            EntityKind::Product,
            EntityKind::ProductCategory,
            EntityKind::Scheduler,
            EntityKind::SchedulerBooking,
            EntityKind::Sequence,
            EntityKind::Project,
            EntityKind::ProjectTask,
        ]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseError::InvalidEntityKind(s.to_string()))
    }
}

/// Billing interval of a subscription plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillingInterval {
    None,
    Monthly,
    Yearly,
}

impl BillingInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingInterval::None => "None",
            BillingInterval::Monthly => "Monthly",
            BillingInterval::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for BillingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BillingInterval {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(BillingInterval::None),
            "Monthly" => Ok(BillingInterval::Monthly),
            "Yearly" => Ok(BillingInterval::Yearly),
            _ => Err(ParseError::InvalidBillingInterval(s.to_string())),
        }
    }
}

/// A complete, self-contained migration set describing one schema design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaGeneration {
    /// The first design (todo lists, companies, contacts)
    Legacy,
    /// The multi-tenant CRM design
    #[default]
    Current,
}

impl SchemaGeneration {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaGeneration::Legacy => "legacy",
            SchemaGeneration::Current => "current",
        }
    }
}

impl fmt::Display for SchemaGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SchemaGeneration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(SchemaGeneration::Legacy),
            "current" => Ok(SchemaGeneration::Current),
            _ => Err(ParseError::InvalidSchemaGeneration(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_role_names() {
        let names: Vec<_> = SystemRole::all().iter().map(|r| r.as_str()).collect();
        assert_eq!(names, vec!["SuperAdmin", "TenantAdmin", "NonTenantAdmin"]);
        assert_eq!(SystemRole::TenantAdmin.normalized_name(), "TENANTADMIN");
    }

    #[test]
    fn test_system_role_parsing() {
        assert_eq!("superadmin".parse::<SystemRole>().unwrap(), SystemRole::SuperAdmin);
        assert!("Owner".parse::<SystemRole>().is_err());
    }

    #[test]
    fn test_entity_kind_round_trips_through_discriminator() {
        for kind in EntityKind::all() {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), *kind);
        }
        // Discriminators are case sensitive, matching what is stored
        assert!("deal".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_entity_kind_tables() {
        assert_eq!(EntityKind::Person.table_name(), "People");
        assert_eq!(EntityKind::ProductCategory.table_name(), "ProductCategories");
        assert!(!EntityKind::SchedulerBooking.is_soft_deletable());
        assert!(EntityKind::Deal.has_lifecycle());
        assert!(!EntityKind::Activity.has_lifecycle());
    }

    #[test]
    fn test_schema_generation() {
        assert_eq!(SchemaGeneration::default(), SchemaGeneration::Current);
        assert_eq!("Legacy".parse::<SchemaGeneration>().unwrap(), SchemaGeneration::Legacy);
        assert!("v2".parse::<SchemaGeneration>().is_err());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&EntityKind::SchedulerBooking).unwrap();
        assert_eq!(json, "\"SchedulerBooking\"");

        let interval: BillingInterval = serde_json::from_str("\"Yearly\"").unwrap();
        assert_eq!(interval, BillingInterval::Yearly);
    }
}
