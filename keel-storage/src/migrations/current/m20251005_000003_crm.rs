use sea_orm_migration::prelude::*;

use super::idens::*;
use crate::migration::{MigrationPlan, SchemaMigration};
use crate::schema::{columns, EntityTable};

#[derive(DeriveMigrationName)]
pub struct Migration;

impl SchemaMigration for Migration {
    fn up(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        let backend = plan.backend();

        EntityTable::new(plan, Organizations::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::string(Organizations::Name, 200))
            .column(columns::string_null(Organizations::Website, 500))
            .column(columns::string_null(Organizations::Industry, 100))
            .column(columns::string_null(Organizations::Phone, 50))
            .column(columns::string_null(Organizations::Email, 256))
            .column(columns::string_null(Organizations::Address, 500))
            .column(columns::string_null(Organizations::City, 100))
            .column(columns::string_null(Organizations::Country, 100))
            .column(columns::int_null(Organizations::EmployeeCount))
            .column(columns::money_null(backend, Organizations::AnnualRevenue))
            .column(columns::int_null(Organizations::OwnerId))
            .foreign_key(Organizations::OwnerId, AspNetUsers::Table, ForeignKeyAction::SetNull)
            .audited()
            .soft_delete()
            .index([Organizations::TenantId, Organizations::Name])
            .create(plan);

        EntityTable::new(plan, People::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::int_null(People::OrganizationId))
            .foreign_key(People::OrganizationId, Organizations::Table, ForeignKeyAction::SetNull)
            .column(columns::string(People::FirstName, 100))
            .column(columns::string_null(People::LastName, 100))
            .column(columns::string_null(People::Email, 256))
            .column(columns::string_null(People::Phone, 50))
            .column(columns::string_null(People::JobTitle, 100))
            .column(columns::int_null(People::OwnerId))
            .foreign_key(People::OwnerId, AspNetUsers::Table, ForeignKeyAction::SetNull)
            .audited()
            .soft_delete()
            .index([People::TenantId, People::Email])
            .create(plan);

        EntityTable::new(plan, Pipelines::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::string(Pipelines::Name, 100))
            .column(columns::string_null(Pipelines::Description, 500))
            .column(columns::flag(Pipelines::IsDefault, false))
            .column(columns::int_default(Pipelines::SortOrder, 0))
            .audited()
            .soft_delete()
            .create(plan);

        EntityTable::new(plan, PipelineStages::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::int(PipelineStages::PipelineId))
            .foreign_key(PipelineStages::PipelineId, Pipelines::Table, ForeignKeyAction::Cascade)
            .column(columns::string(PipelineStages::Name, 100))
            .column(columns::int_default(PipelineStages::SortOrder, 0))
            .column(columns::int_default(PipelineStages::Probability, 0))
            .column(columns::flag(PipelineStages::IsWon, false))
            .column(columns::flag(PipelineStages::IsLost, false))
            .audited()
            .index([PipelineStages::PipelineId, PipelineStages::SortOrder])
            .create(plan);

        EntityTable::new(plan, Leads::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::string(Leads::Title, 200))
            .column(columns::string_null(Leads::FirstName, 100))
            .column(columns::string_null(Leads::LastName, 100))
            .column(columns::string_null(Leads::Email, 256))
            .column(columns::string_null(Leads::Phone, 50))
            .column(columns::string_null(Leads::CompanyName, 200))
            .column(columns::string_null(Leads::Source, 100))
            .column(columns::string_default(Leads::Status, 20, "New"))
            .column(columns::int_default(Leads::Score, 0))
            .column(columns::int_null(Leads::OwnerId))
            .foreign_key(Leads::OwnerId, AspNetUsers::Table, ForeignKeyAction::SetNull)
            .column(columns::int_null(Leads::OrganizationId))
            .foreign_key(Leads::OrganizationId, Organizations::Table, ForeignKeyAction::SetNull)
            .column(columns::int_null(Leads::PersonId))
            .foreign_key(Leads::PersonId, People::Table, ForeignKeyAction::SetNull)
            .audited()
            .soft_delete()
            .index([Leads::TenantId, Leads::Status])
            .create(plan);

        EntityTable::new(plan, Deals::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::string(Deals::Title, 200))
            .column(columns::money(backend, Deals::Value))
            .column(columns::currency(Deals::Currency))
            // A pipeline or stage still holding deals cannot be removed
            .column(columns::int(Deals::PipelineId))
            .foreign_key(Deals::PipelineId, Pipelines::Table, ForeignKeyAction::NoAction)
            .column(columns::int(Deals::PipelineStageId))
            .foreign_key(Deals::PipelineStageId, PipelineStages::Table, ForeignKeyAction::NoAction)
            .column(columns::int_null(Deals::OrganizationId))
            .foreign_key(Deals::OrganizationId, Organizations::Table, ForeignKeyAction::SetNull)
            .column(columns::int_null(Deals::PersonId))
            .foreign_key(Deals::PersonId, People::Table, ForeignKeyAction::SetNull)
            .column(columns::int_null(Deals::LeadId))
            .foreign_key(Deals::LeadId, Leads::Table, ForeignKeyAction::SetNull)
            .column(columns::int_null(Deals::OwnerId))
            .foreign_key(Deals::OwnerId, AspNetUsers::Table, ForeignKeyAction::SetNull)
            .column(columns::date_null(Deals::ExpectedCloseDate))
            .column(columns::timestamp(Deals::ClosedAt))
            .column(columns::string_default(Deals::Status, 20, "Open"))
            .audited()
            .soft_delete()
            .index([Deals::TenantId, Deals::Status])
            .create(plan);

        EntityTable::new(plan, DealStageHistories::Table)
            .tenant_scoped()
            .column(columns::int(DealStageHistories::DealId))
            .foreign_key(DealStageHistories::DealId, Deals::Table, ForeignKeyAction::Cascade)
            .column(columns::int_null(DealStageHistories::PreviousStageId))
            .foreign_key(
                DealStageHistories::PreviousStageId,
                PipelineStages::Table,
                ForeignKeyAction::SetNull,
            )
            .column(columns::int(DealStageHistories::NextStageId))
            .foreign_key(
                DealStageHistories::NextStageId,
                PipelineStages::Table,
                ForeignKeyAction::NoAction,
            )
            .column(columns::created_at(backend, DealStageHistories::EnteredAt))
            .column(columns::timestamp(DealStageHistories::ExitedAt))
            .column(columns::int_null(DealStageHistories::ChangedBy))
            .foreign_key(DealStageHistories::ChangedBy, AspNetUsers::Table, ForeignKeyAction::SetNull)
            .index([DealStageHistories::DealId, DealStageHistories::EnteredAt])
            .create(plan);

        EntityTable::new(plan, Activities::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::string(Activities::Type, 50))
            .column(columns::string(Activities::Subject, 200))
            .column(columns::text_null(Activities::Description))
            .column(columns::timestamp(Activities::DueAt))
            .column(columns::timestamp(Activities::CompletedAt))
            .column(columns::flag(Activities::IsCompleted, false))
            .column(columns::int_null(Activities::OwnerId))
            .foreign_key(Activities::OwnerId, AspNetUsers::Table, ForeignKeyAction::SetNull)
            .column(columns::int_null(Activities::DealId))
            .foreign_key(Activities::DealId, Deals::Table, ForeignKeyAction::Cascade)
            .column(columns::int_null(Activities::PersonId))
            .foreign_key(Activities::PersonId, People::Table, ForeignKeyAction::SetNull)
            .column(columns::int_null(Activities::OrganizationId))
            .foreign_key(Activities::OrganizationId, Organizations::Table, ForeignKeyAction::SetNull)
            .column(columns::int_null(Activities::LeadId))
            .foreign_key(Activities::LeadId, Leads::Table, ForeignKeyAction::SetNull)
            .audited()
            .soft_delete()
            .index([Activities::TenantId, Activities::DueAt])
            .create(plan);
        Ok(())
    }

    fn down(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        plan.drop_table(Activities::Table)
            .drop_table(DealStageHistories::Table)
            .drop_table(Deals::Table)
            .drop_table(Leads::Table)
            .drop_table(PipelineStages::Table)
            .drop_table(Pipelines::Table)
            .drop_table(People::Table)
            .drop_table(Organizations::Table);
        Ok(())
    }
}
