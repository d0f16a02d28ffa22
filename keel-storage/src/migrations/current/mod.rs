//! The multi-tenant CRM schema (`m20251005_*`)

pub mod idens;

pub mod m20251005_000001_identity;
pub mod m20251005_000002_tenancy;
pub mod m20251005_000003_crm;
pub mod m20251005_000004_catalog;
pub mod m20251005_000005_engagement;
pub mod m20251005_000006_projects;
pub mod m20251005_000007_entity_associations;
pub mod m20251005_000008_entity_lifecycle;

use crate::migration::SchemaMigration;

pub fn migrations() -> Vec<Box<dyn SchemaMigration>> {
    vec![
        Box::new(m20251005_000001_identity::Migration),
        Box::new(m20251005_000002_tenancy::Migration),
        Box::new(m20251005_000003_crm::Migration),
        Box::new(m20251005_000004_catalog::Migration),
        Box::new(m20251005_000005_engagement::Migration),
        Box::new(m20251005_000006_projects::Migration),
        Box::new(m20251005_000007_entity_associations::Migration),
        Box::new(m20251005_000008_entity_lifecycle::Migration),
    ]
}
