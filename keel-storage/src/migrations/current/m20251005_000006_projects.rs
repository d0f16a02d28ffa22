use sea_orm_migration::prelude::*;

use super::idens::*;
use crate::migration::{MigrationPlan, SchemaMigration};
use crate::schema::{columns, EntityTable};

#[derive(DeriveMigrationName)]
pub struct Migration;

impl SchemaMigration for Migration {
    fn up(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        EntityTable::new(plan, Projects::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::string(Projects::Name, 200))
            .column(columns::text_null(Projects::Description))
            .column(columns::string_default(Projects::Status, 20, "Planned"))
            .column(columns::date_null(Projects::StartDate))
            .column(columns::date_null(Projects::DueDate))
            .column(columns::int_null(Projects::OwnerId))
            .foreign_key(Projects::OwnerId, AspNetUsers::Table, ForeignKeyAction::SetNull)
            .column(columns::int_null(Projects::DealId))
            .foreign_key(Projects::DealId, Deals::Table, ForeignKeyAction::SetNull)
            .column(columns::int_null(Projects::OrganizationId))
            .foreign_key(Projects::OrganizationId, Organizations::Table, ForeignKeyAction::SetNull)
            .audited()
            .soft_delete()
            .create(plan);

        EntityTable::new(plan, ProjectTasks::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::int(ProjectTasks::ProjectId))
            .foreign_key(ProjectTasks::ProjectId, Projects::Table, ForeignKeyAction::Cascade)
            .column(columns::int_null(ProjectTasks::ParentTaskId))
            .foreign_key(ProjectTasks::ParentTaskId, ProjectTasks::Table, ForeignKeyAction::NoAction)
            .column(columns::string(ProjectTasks::Title, 200))
            .column(columns::text_null(ProjectTasks::Description))
            .column(columns::string_default(ProjectTasks::Status, 20, "Todo"))
            .column(columns::string_default(ProjectTasks::Priority, 20, "Normal"))
            .column(columns::date_null(ProjectTasks::DueDate))
            .column(columns::timestamp(ProjectTasks::CompletedAt))
            .column(columns::int_null(ProjectTasks::AssigneeId))
            .foreign_key(ProjectTasks::AssigneeId, AspNetUsers::Table, ForeignKeyAction::SetNull)
            .column(columns::int_default(ProjectTasks::SortOrder, 0))
            .audited()
            .soft_delete()
            .create(plan);
        Ok(())
    }

    fn down(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        plan.drop_table(ProjectTasks::Table).drop_table(Projects::Table);
        Ok(())
    }
}
