use sea_orm_migration::prelude::*;

use super::idens::*;
use crate::migration::{MigrationPlan, SchemaMigration};
use crate::schema::{columns, EntityTable};
use crate::seed;

#[derive(DeriveMigrationName)]
pub struct Migration;

impl SchemaMigration for Migration {
    fn up(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        let backend = plan.backend();

        EntityTable::new(plan, AspNetUsers::Table)
            .public_id()
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
            .column(columns::string_null(AspNetUsers::FirstName, 100))
            .column(columns::string_null(AspNetUsers::LastName, 100))
            .column(columns::flag(AspNetUsers::IsActive, true))
            .column(columns::timestamp(AspNetUsers::LastLoginAt))
            // Users are the audit target, so their own audit columns carry no key
            .column(columns::created_at(backend, AspNetUsers::Created))
            .column(columns::timestamp(AspNetUsers::LastModified))
            .named_index("UserNameIndex", [AspNetUsers::NormalizedUserName], true)
            .named_index("EmailIndex", [AspNetUsers::NormalizedEmail], false)
            .create(plan);

        EntityTable::new(plan, AspNetRoles::Table)
            .column(columns::string_null(AspNetRoles::Name, 256))
            .column(columns::string_null(AspNetRoles::NormalizedName, 256))
            .column(columns::text_null(AspNetRoles::ConcurrencyStamp))
            .column(columns::string_null(AspNetRoles::Description, 500))
            .column(columns::flag(AspNetRoles::IsSystemRole, false))
            .column(columns::created_at(backend, AspNetRoles::Created))
            .named_index("RoleNameIndex", [AspNetRoles::NormalizedName], true)
            .create(plan);

        seed::system_roles(plan)?;

        EntityTable::keyed(plan, AspNetUserRoles::Table, [AspNetUserRoles::UserId, AspNetUserRoles::RoleId])
            .column(columns::int(AspNetUserRoles::UserId))
            .column(columns::int(AspNetUserRoles::RoleId))
            .foreign_key(AspNetUserRoles::UserId, AspNetUsers::Table, ForeignKeyAction::Cascade)
            .foreign_key(AspNetUserRoles::RoleId, AspNetRoles::Table, ForeignKeyAction::Cascade)
            .create(plan);

        EntityTable::new(plan, AspNetUserClaims::Table)
            .column(columns::int(AspNetUserClaims::UserId))
            .column(columns::text_null(AspNetUserClaims::ClaimType))
            .column(columns::text_null(AspNetUserClaims::ClaimValue))
            .foreign_key(AspNetUserClaims::UserId, AspNetUsers::Table, ForeignKeyAction::Cascade)
            .create(plan);

        EntityTable::new(plan, AspNetRoleClaims::Table)
            .column(columns::int(AspNetRoleClaims::RoleId))
            .column(columns::text_null(AspNetRoleClaims::ClaimType))
            .column(columns::text_null(AspNetRoleClaims::ClaimValue))
            .foreign_key(AspNetRoleClaims::RoleId, AspNetRoles::Table, ForeignKeyAction::Cascade)
            .create(plan);

        EntityTable::keyed(
            plan,
            AspNetUserLogins::Table,
            [AspNetUserLogins::LoginProvider, AspNetUserLogins::ProviderKey],
        )
        .column(columns::string(AspNetUserLogins::LoginProvider, 128))
        .column(columns::string(AspNetUserLogins::ProviderKey, 128))
        .column(columns::text_null(AspNetUserLogins::ProviderDisplayName))
        .column(columns::int(AspNetUserLogins::UserId))
        .foreign_key(AspNetUserLogins::UserId, AspNetUsers::Table, ForeignKeyAction::Cascade)
        .create(plan);

        EntityTable::keyed(
            plan,
            AspNetUserTokens::Table,
            [
                AspNetUserTokens::UserId,
                AspNetUserTokens::LoginProvider,
                AspNetUserTokens::Name,
            ],
        )
        .column(columns::int(AspNetUserTokens::UserId))
        .column(columns::string(AspNetUserTokens::LoginProvider, 128))
        .column(columns::string(AspNetUserTokens::Name, 128))
        .column(columns::text_null(AspNetUserTokens::Value))
        .foreign_key(AspNetUserTokens::UserId, AspNetUsers::Table, ForeignKeyAction::Cascade)
        .create(plan);
        Ok(())
    }

    fn down(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        plan.drop_table(AspNetUserTokens::Table)
            .drop_table(AspNetUserLogins::Table)
            .drop_table(AspNetRoleClaims::Table)
            .drop_table(AspNetUserClaims::Table)
            .drop_table(AspNetUserRoles::Table)
            .drop_table(AspNetRoles::Table)
            .drop_table(AspNetUsers::Table);
        Ok(())
    }
}
