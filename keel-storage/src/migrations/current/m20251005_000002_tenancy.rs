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

        EntityTable::new(plan, SubscriptionPlans::Table)
            .column(columns::string(SubscriptionPlans::Code, 50))
            .column(columns::string(SubscriptionPlans::Name, 100))
            .column(columns::string_null(SubscriptionPlans::Description, 500))
            .column(columns::money(backend, SubscriptionPlans::Price))
            .column(columns::currency(SubscriptionPlans::Currency))
            .column(columns::string(SubscriptionPlans::BillingInterval, 20))
            .column(columns::int_null(SubscriptionPlans::MaxUsers))
            .column(columns::int_null(SubscriptionPlans::MaxContacts))
            .column(columns::int_null(SubscriptionPlans::MaxDeals))
            .column(columns::int_null(SubscriptionPlans::MaxStorageMb))
            .column(columns::int_default(SubscriptionPlans::TrialDays, 0))
            .column(columns::flag(SubscriptionPlans::IsActive, true))
            .column(columns::int_default(SubscriptionPlans::SortOrder, 0))
            .column(columns::json_null(SubscriptionPlans::Features))
            .column(columns::created_at(backend, SubscriptionPlans::Created))
            .unique_index([SubscriptionPlans::Code])
            .create(plan);

        seed::subscription_plans(plan)?;

        EntityTable::new(plan, Tenants::Table)
            .public_id()
            .column(columns::string(Tenants::Name, 200))
            .column(columns::string(Tenants::Slug, 100))
            .column(columns::string_null(Tenants::Domain, 255))
            .column(columns::string_null(Tenants::LogoUrl, 500))
            .column(columns::string_default(Tenants::TimeZone, 100, "UTC"))
            .column(columns::currency(Tenants::Currency))
            .column(columns::json_null(Tenants::Settings))
            .audited()
            .soft_delete()
            .unique_index([Tenants::Slug])
            .create(plan);

        EntityTable::new(plan, TenantUsers::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::int(TenantUsers::ApplicationUserId))
            .foreign_key(
                TenantUsers::ApplicationUserId,
                AspNetUsers::Table,
                ForeignKeyAction::Cascade,
            )
            .column(columns::flag(TenantUsers::IsOwner, false))
            .column(columns::created_at(backend, TenantUsers::JoinedAt))
            .column(columns::int_null(TenantUsers::InvitedBy))
            .foreign_key(TenantUsers::InvitedBy, AspNetUsers::Table, ForeignKeyAction::SetNull)
            .audited()
            .soft_delete()
            .unique_index([TenantUsers::TenantId, TenantUsers::ApplicationUserId])
            .create(plan);

        EntityTable::new(plan, Subscriptions::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::int(Subscriptions::SubscriptionPlanId))
            .foreign_key(
                Subscriptions::SubscriptionPlanId,
                SubscriptionPlans::Table,
                ForeignKeyAction::Restrict,
            )
            .column(columns::string_default(Subscriptions::Status, 20, "Active"))
            .column(columns::created_at(backend, Subscriptions::StartDate))
            .column(columns::timestamp(Subscriptions::EndDate))
            .column(columns::timestamp(Subscriptions::TrialEndsAt))
            .column(columns::timestamp(Subscriptions::CancelledAt))
            .column(columns::string_null(Subscriptions::ExternalSubscriptionId, 200))
            .audited()
            .create(plan);
        Ok(())
    }

    fn down(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        plan.drop_table(Subscriptions::Table)
            .drop_table(TenantUsers::Table)
            .drop_table(Tenants::Table)
            .drop_table(SubscriptionPlans::Table);
        Ok(())
    }
}
