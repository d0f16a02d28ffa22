use sea_orm_migration::prelude::*;

use super::idens::*;
use crate::migration::{MigrationPlan, SchemaMigration};
use crate::schema::{columns, EntityTable};

#[derive(DeriveMigrationName)]
pub struct Migration;

impl SchemaMigration for Migration {
    fn up(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        let backend = plan.backend();

        EntityTable::new(plan, ProductCategories::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::string(ProductCategories::Name, 100))
            .column(columns::string_null(ProductCategories::Description, 500))
            .column(columns::int_null(ProductCategories::ParentCategoryId))
            .foreign_key(
                ProductCategories::ParentCategoryId,
                ProductCategories::Table,
                ForeignKeyAction::NoAction,
            )
            .column(columns::int_default(ProductCategories::SortOrder, 0))
            .audited()
            .soft_delete()
            .create(plan);

        EntityTable::new(plan, Products::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::int_null(Products::CategoryId))
            .foreign_key(Products::CategoryId, ProductCategories::Table, ForeignKeyAction::SetNull)
            .column(columns::string(Products::Name, 200))
            .column(columns::string_null(Products::Sku, 100))
            .column(columns::text_null(Products::Description))
            .column(columns::money(backend, Products::Price))
            .column(columns::currency(Products::Currency))
            .column(columns::flag(Products::IsActive, true))
            .audited()
            .soft_delete()
            .unique_index([Products::TenantId, Products::Sku])
            .create(plan);

        EntityTable::new(plan, DealProducts::Table)
            .tenant_scoped()
            .column(columns::int(DealProducts::DealId))
            .foreign_key(DealProducts::DealId, Deals::Table, ForeignKeyAction::Cascade)
            .column(columns::int(DealProducts::ProductId))
            .foreign_key(DealProducts::ProductId, Products::Table, ForeignKeyAction::NoAction)
            .column(columns::int_default(DealProducts::Quantity, 1))
            .column(columns::money(backend, DealProducts::UnitPrice))
            .column(columns::money(backend, DealProducts::Discount))
            .created()
            .create(plan);
        Ok(())
    }

    fn down(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        plan.drop_table(DealProducts::Table)
            .drop_table(Products::Table)
            .drop_table(ProductCategories::Table);
        Ok(())
    }
}
