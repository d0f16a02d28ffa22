//! Migration sets, one per schema generation
//!
//! Each generation is complete on its own: a database is created from one
//! set and never receives migrations from the other.

pub mod current;
pub mod legacy;

use keel_core::SchemaGeneration;

use crate::migration::MigrationSet;

pub fn for_generation(generation: SchemaGeneration) -> MigrationSet {
    let migrations = match generation {
        SchemaGeneration::Legacy => legacy::migrations(),
        SchemaGeneration::Current => current::migrations(),
    };
    MigrationSet::new(generation, migrations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::Direction;
    use sea_orm::DbBackend;
    use std::collections::BTreeSet;

    fn created_tables(generation: SchemaGeneration) -> BTreeSet<String> {
        tables_matching(generation, Direction::Up, "CREATE TABLE \"")
    }

    fn dropped_tables(generation: SchemaGeneration) -> BTreeSet<String> {
        tables_matching(generation, Direction::Down, "DROP TABLE \"")
    }

    fn tables_matching(generation: SchemaGeneration, direction: Direction, prefix: &str) -> BTreeSet<String> {
        for_generation(generation)
            .plan_sql(DbBackend::Postgres, direction)
            .unwrap()
            .into_iter()
            .flat_map(|m| m.statements)
            .filter_map(|sql| {
                sql.strip_prefix(prefix)
                    .and_then(|rest| rest.split('"').next())
                    .map(str::to_string)
            })
            .collect()
    }

    #[test]
    fn test_every_created_table_is_dropped() {
        for generation in [SchemaGeneration::Legacy, SchemaGeneration::Current] {
            let created = created_tables(generation);
            assert!(!created.is_empty());
            assert_eq!(created, dropped_tables(generation), "{}", generation);
        }
    }

    #[test]
    fn test_current_table_inventory() {
        let tables = created_tables(SchemaGeneration::Current);
        for table in [
            "AspNetUsers",
            "AspNetRoles",
            "SubscriptionPlans",
            "Tenants",
            "TenantUsers",
            "Subscriptions",
            "PipelineStages",
            "DealStageHistories",
            "ProductCategories",
            "SchedulerBookings",
            "SequenceEnrollments",
            "ProjectTasks",
            "EntityParticipants",
        ] {
            assert!(tables.contains(table), "missing {}", table);
        }
        assert!(!tables.contains("TodoLists"));
    }

    #[test]
    fn test_legacy_table_inventory() {
        let tables: Vec<_> = created_tables(SchemaGeneration::Legacy).into_iter().collect();
        assert_eq!(
            tables,
            vec![
                "AspNetRoles",
                "AspNetUserRoles",
                "AspNetUsers",
                "Companies",
                "Contacts",
                "Leads",
                "Stages",
                "Tenants",
                "TodoItems",
                "TodoLists",
            ]
        );
    }

    #[test]
    fn test_polymorphic_tables_have_no_foreign_key_on_the_pair() {
        let set = for_generation(SchemaGeneration::Current);
        let sql = set.plan_sql(DbBackend::Postgres, Direction::Up).unwrap();
        let associations = sql
            .iter()
            .find(|m| m.version == "m20251005_000007_entity_associations")
            .map(|m| m.statements.join("\n"))
            .unwrap_or_default();

        assert!(associations.contains("IX_EntityNotes_TenantId_EntityType_EntityId"));
        assert!(!associations.contains("FOREIGN KEY (\"EntityId\")"));
    }

    #[test]
    fn test_every_generation_renders_on_sqlite() {
        for generation in [SchemaGeneration::Legacy, SchemaGeneration::Current] {
            let set = for_generation(generation);
            for direction in [Direction::Up, Direction::Down] {
                let planned = set.plan_sql(DbBackend::Sqlite, direction).unwrap();
                assert_eq!(planned.len(), set.len(), "{} {}", generation, direction);
                assert!(planned.iter().all(|m| !m.statements.is_empty()));
            }
            let up = set.plan_sql(DbBackend::Sqlite, Direction::Up).unwrap();
            assert!(up
                .iter()
                .flat_map(|m| &m.statements)
                .any(|sql| sql.contains("numeric(18,2)")));
        }
    }
}
