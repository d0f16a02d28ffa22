//! Suspend / resume support for the lifecycle-managed tables

use sea_orm::sea_query::DynIden;
use sea_orm_migration::prelude::*;

use super::idens::*;
use crate::migration::{MigrationPlan, SchemaMigration};
use crate::schema::{columns, naming, Common};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Tables gaining `EntityStatus`, `SuspendedAt` and `ResumedAt`
pub fn lifecycle_tables() -> Vec<DynIden> {
    vec![
        Tenants::Table.into_iden(),
        TenantUsers::Table.into_iden(),
        Organizations::Table.into_iden(),
        People::Table.into_iden(),
        Leads::Table.into_iden(),
        Deals::Table.into_iden(),
        Pipelines::Table.into_iden(),
        Products::Table.into_iden(),
        Schedulers::Table.into_iden(),
        Sequences::Table.into_iden(),
        Projects::Table.into_iden(),
    ]
}

/// `Tenants` is not tenant scoped, so its index covers the status alone
fn status_index_columns(table: &DynIden) -> Vec<Common> {
    if table.to_string() == Tenants::Table.to_string() {
        vec![Common::EntityStatus]
    } else {
        vec![Common::TenantId, Common::EntityStatus]
    }
}

fn status_index_name(table: &DynIden) -> String {
    let columns: Vec<String> = status_index_columns(table)
        .iter()
        .map(|c| c.to_string())
        .collect();
    naming::index(&table.to_string(), &columns)
}

impl SchemaMigration for Migration {
    fn up(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        for table in lifecycle_tables() {
            // SQLite accepts a single change per ALTER TABLE
            for mut column in [
                columns::entity_status(Common::EntityStatus),
                columns::timestamp(Common::SuspendedAt),
                columns::timestamp(Common::ResumedAt),
            ] {
                plan.push(
                    &Table::alter()
                        .table(table.clone())
                        .add_column(&mut column)
                        .to_owned(),
                );
            }

            let mut index = Index::create();
            index.name(status_index_name(&table)).table(table.clone());
            for column in status_index_columns(&table) {
                index.col(column);
            }
            plan.push(&index);
        }
        Ok(())
    }

    fn down(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        for table in lifecycle_tables().into_iter().rev() {
            plan.drop_index(&status_index_name(&table), table.clone());
            for column in [Common::ResumedAt, Common::SuspendedAt, Common::EntityStatus] {
                plan.push(
                    &Table::alter()
                        .table(table.clone())
                        .drop_column(column)
                        .to_owned(),
                );
            }
        }
        Ok(())
    }
}
