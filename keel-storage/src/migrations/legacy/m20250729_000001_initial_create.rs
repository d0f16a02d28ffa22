use sea_orm_migration::prelude::*;

use crate::migration::{MigrationPlan, SchemaMigration};
use crate::schema::{columns, table_idens, EntityTable};
use crate::seed;

table_idens! {
    AspNetUsers {
        UserName, NormalizedUserName, Email, NormalizedEmail, EmailConfirmed, PasswordHash,
        SecurityStamp, ConcurrencyStamp, PhoneNumber, PhoneNumberConfirmed, TwoFactorEnabled,
        LockoutEnd, LockoutEnabled, AccessFailedCount, IsActive
    }
    AspNetRoles { Name, NormalizedName, ConcurrencyStamp, Description, IsSystemRole }
    AspNetUserRoles { UserId, RoleId }
    Tenants { Name, IsActive }
    TodoLists { Title, Colour }
    TodoItems { ListId, Title, Note, Priority, Reminder, Done }
    Companies { Name, Website, Industry }
    Contacts { CompanyId, FirstName, LastName, Email, Phone }
    Stages { Name, SortOrder }
    Leads { Title, Value, Status, StageId, ContactId, CompanyId }
}

#[derive(DeriveMigrationName)]
pub struct Migration;

impl SchemaMigration for Migration {
    fn up(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        let backend = plan.backend();

        EntityTable::new(plan, AspNetUsers::Table)
            .column(columns::string_null(AspNetUsers::UserName, 256))
            .column(columns::string_null(AspNetUsers::NormalizedUserName, 256))
            .column(columns::string_null(AspNetUsers::Email, 256))
            .column(columns::string_null(AspNetUsers::NormalizedEmail, 256))
            .column(columns::flag(AspNetUsers::EmailConfirmed, false))
            .column(columns::text_null(AspNetUsers::PasswordHash))
            .column(columns::text_null(AspNetUsers::SecurityStamp))
            .column(columns::text_null(AspNetUsers::ConcurrencyStamp))
            .column(columns::text_null(AspNetUsers::PhoneNumber))
            .column(columns::flag(AspNetUsers::PhoneNumberConfirmed, false))
            .column(columns::flag(AspNetUsers::TwoFactorEnabled, false))
            .column(columns::timestamp(AspNetUsers::LockoutEnd))
            .column(columns::flag(AspNetUsers::LockoutEnabled, false))
            .column(columns::int_default(AspNetUsers::AccessFailedCount, 0))
            .column(columns::flag(AspNetUsers::IsActive, true))
            .column(columns::created_at(backend, AspNetUsers::Created))
            .named_index("UserNameIndex", [AspNetUsers::NormalizedUserName], true)
            .named_index("EmailIndex", [AspNetUsers::NormalizedEmail], false)
            .create(plan);

        EntityTable::new(plan, AspNetRoles::Table)
            .column(columns::string_null(AspNetRoles::Name, 256))
            .column(columns::string_null(AspNetRoles::NormalizedName, 256))
            .column(columns::text_null(AspNetRoles::ConcurrencyStamp))
            .column(columns::string_null(AspNetRoles::Description, 500))
            .column(columns::flag(AspNetRoles::IsSystemRole, false))
            .named_index("RoleNameIndex", [AspNetRoles::NormalizedName], true)
            .create(plan);

        seed::system_roles(plan)?;

        EntityTable::keyed(plan, AspNetUserRoles::Table, [AspNetUserRoles::UserId, AspNetUserRoles::RoleId])
            .column(columns::int(AspNetUserRoles::UserId))
            .column(columns::int(AspNetUserRoles::RoleId))
            .foreign_key(AspNetUserRoles::UserId, AspNetUsers::Table, ForeignKeyAction::Cascade)
            .foreign_key(AspNetUserRoles::RoleId, AspNetRoles::Table, ForeignKeyAction::Cascade)
            .create(plan);

        EntityTable::new(plan, Tenants::Table)
            .public_id()
            .column(columns::string(Tenants::Name, 200))
            .column(columns::flag(Tenants::IsActive, true))
            .audited()
            .create(plan);

        EntityTable::new(plan, TodoLists::Table)
            .tenant_scoped()
            .column(columns::string(TodoLists::Title, 200))
            .column(columns::string_null(TodoLists::Colour, 20))
            .created()
            .create(plan);

        EntityTable::new(plan, TodoItems::Table)
            .tenant_scoped()
            .column(columns::int(TodoItems::ListId))
            .foreign_key(TodoItems::ListId, TodoLists::Table, ForeignKeyAction::Cascade)
            .column(columns::string(TodoItems::Title, 200))
            .column(columns::text_null(TodoItems::Note))
            .column(columns::int_default(TodoItems::Priority, 0))
            .column(columns::timestamp(TodoItems::Reminder))
            .column(columns::flag(TodoItems::Done, false))
            .created()
            .create(plan);

        EntityTable::new(plan, Companies::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::string(Companies::Name, 200))
            .column(columns::string_null(Companies::Website, 500))
            .column(columns::string_null(Companies::Industry, 100))
            .audited()
            .soft_delete()
            .create(plan);

        EntityTable::new(plan, Contacts::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::int_null(Contacts::CompanyId))
            .foreign_key(Contacts::CompanyId, Companies::Table, ForeignKeyAction::SetNull)
            .column(columns::string(Contacts::FirstName, 100))
            .column(columns::string_null(Contacts::LastName, 100))
            .column(columns::string_null(Contacts::Email, 256))
            .column(columns::string_null(Contacts::Phone, 50))
            .audited()
            .soft_delete()
            .create(plan);

        EntityTable::new(plan, Stages::Table)
            .tenant_scoped()
            .column(columns::string(Stages::Name, 100))
            .column(columns::int_default(Stages::SortOrder, 0))
            .created()
            .create(plan);

        EntityTable::new(plan, Leads::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::string(Leads::Title, 200))
            .column(columns::money(backend, Leads::Value))
            .column(columns::string_default(Leads::Status, 20, "New"))
            .column(columns::int(Leads::StageId))
            .foreign_key(Leads::StageId, Stages::Table, ForeignKeyAction::NoAction)
            .column(columns::int_null(Leads::ContactId))
            .foreign_key(Leads::ContactId, Contacts::Table, ForeignKeyAction::SetNull)
            .column(columns::int_null(Leads::CompanyId))
            .foreign_key(Leads::CompanyId, Companies::Table, ForeignKeyAction::SetNull)
            .audited()
            .soft_delete()
            .create(plan);
        Ok(())
    }

    fn down(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        plan.drop_table(Leads::Table)
            .drop_table(Stages::Table)
            .drop_table(Contacts::Table)
            .drop_table(Companies::Table)
            .drop_table(TodoItems::Table)
            .drop_table(TodoLists::Table)
            .drop_table(Tenants::Table)
            .drop_table(AspNetUserRoles::Table)
            .drop_table(AspNetRoles::Table)
            .drop_table(AspNetUsers::Table);
        Ok(())
    }
}
