//! `Labels` and the polymorphic attachment tables.
//!
//! The attachment tables reference their owner through `(EntityType, EntityId)`
//! with no foreign key; `integrity::EntityResolver` checks those pairs.

use sea_orm_migration::prelude::*;

use super::idens::*;
use crate::migration::{MigrationPlan, SchemaMigration};
use crate::schema::{columns, EntityTable};

#[derive(DeriveMigrationName)]
pub struct Migration;

impl SchemaMigration for Migration {
    fn up(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        let backend = plan.backend();

        EntityTable::new(plan, Labels::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::string(Labels::Name, 100))
            .column(columns::string_null(Labels::Color, 20))
            .audited()
            .unique_index([Labels::TenantId, Labels::Name])
            .create(plan);

        EntityTable::new(plan, EntityLabels::Table)
            .tenant_scoped()
            .column(columns::int(EntityLabels::LabelId))
            .foreign_key(EntityLabels::LabelId, Labels::Table, ForeignKeyAction::Cascade)
            .polymorphic()
            .created()
            .create(plan);

        EntityTable::new(plan, EntityNotes::Table)
            .public_id()
            .tenant_scoped()
            .polymorphic()
            .column(columns::text(EntityNotes::Content))
            .audited()
            .soft_delete()
            .create(plan);

        EntityTable::new(plan, EntityComments::Table)
            .public_id()
            .tenant_scoped()
            .polymorphic()
            .column(columns::int_null(EntityComments::ParentCommentId))
            .foreign_key(
                EntityComments::ParentCommentId,
                EntityComments::Table,
                ForeignKeyAction::Cascade,
            )
            .column(columns::text(EntityComments::Content))
            .audited()
            .soft_delete()
            .create(plan);

        EntityTable::new(plan, EntityDocuments::Table)
            .public_id()
            .tenant_scoped()
            .polymorphic()
            .column(columns::string(EntityDocuments::FileName, 255))
            .column(columns::string_null(EntityDocuments::ContentType, 100))
            .column(columns::int_default(EntityDocuments::SizeBytes, 0))
            .column(columns::string(EntityDocuments::StoragePath, 1000))
            .audited()
            .soft_delete()
            .create(plan);

        EntityTable::new(plan, EntityImages::Table)
            .public_id()
            .tenant_scoped()
            .polymorphic()
            .column(columns::string(EntityImages::Url, 1000))
            .column(columns::string_null(EntityImages::AltText, 255))
            .column(columns::flag(EntityImages::IsPrimary, false))
            .column(columns::int_default(EntityImages::SortOrder, 0))
            .created()
            .create(plan);

        EntityTable::new(plan, EntityPrices::Table)
            .tenant_scoped()
            .polymorphic()
            .column(columns::money(backend, EntityPrices::Amount))
            .column(columns::currency(EntityPrices::Currency))
            .column(columns::date_null(EntityPrices::ValidFrom))
            .column(columns::date_null(EntityPrices::ValidTo))
            .audited()
            .create(plan);

        EntityTable::new(plan, EntityParticipants::Table)
            .tenant_scoped()
            .polymorphic()
            .column(columns::int_null(EntityParticipants::UserId))
            .foreign_key(EntityParticipants::UserId, AspNetUsers::Table, ForeignKeyAction::Cascade)
            .column(columns::int_null(EntityParticipants::PersonId))
            .foreign_key(EntityParticipants::PersonId, People::Table, ForeignKeyAction::Cascade)
            .column(columns::string_null(EntityParticipants::Role, 50))
            .created()
            .create(plan);
        Ok(())
    }

    fn down(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        plan.drop_table(EntityParticipants::Table)
            .drop_table(EntityPrices::Table)
            .drop_table(EntityImages::Table)
            .drop_table(EntityDocuments::Table)
            .drop_table(EntityComments::Table)
            .drop_table(EntityNotes::Table)
            .drop_table(EntityLabels::Table)
            .drop_table(Labels::Table);
        Ok(())
    }
}
