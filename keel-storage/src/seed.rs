//! Fixed seed rows inserted by the migrations that create their tables
//!
//! Seeds are plain `INSERT` statements in the migration plan, so reverting
//! the migration drops them with the table and re-applying inserts them again.

use keel_core::{BillingInterval, SystemRole};
use sea_orm::sea_query::{Expr, Query, SimpleExpr};
use sea_orm::DbErr;

use crate::migration::MigrationPlan;
use crate::schema::table_idens;

table_idens! {
    AspNetRoles { Name, NormalizedName, ConcurrencyStamp, Description, IsSystemRole }
    SubscriptionPlans {
        Code, Name, Description, Price, Currency, BillingInterval, MaxUsers, MaxContacts,
        MaxDeals, MaxStorageMb, TrialDays, IsActive, SortOrder, Features
    }
}

/// Concurrency stamps of the seeded roles, fixed so that every database
/// carries identical rows
pub fn role_concurrency_stamp(role: SystemRole) -> &'static str {
    match role {
        SystemRole::SuperAdmin => "3b2f9c1e-7d4a-4e55-9a61-0c8d2f6b1a01",
        SystemRole::TenantAdmin => "8e41d7a2-52c9-4b0f-b3d6-91f4e0a7c202",
        SystemRole::NonTenantAdmin => "c6a05b93-1f8e-4d27-8c4a-5e2b9d3f7303",
    }
}

fn invalid_row(table: &str, error: sea_orm::sea_query::error::Error) -> DbErr {
    DbErr::Custom(format!("Invalid {} seed row: {}", table, error))
}

/// Insert the three system roles into `AspNetRoles`
pub fn system_roles(plan: &mut MigrationPlan) -> Result<(), DbErr> {
    let mut insert = Query::insert();
    insert.into_table(AspNetRoles::Table).columns([
        AspNetRoles::Name,
        AspNetRoles::NormalizedName,
        AspNetRoles::ConcurrencyStamp,
        AspNetRoles::Description,
        AspNetRoles::IsSystemRole,
    ]);

    for role in SystemRole::all() {
        insert
            .values([
                role.as_str().into(),
                role.normalized_name().into(),
                role_concurrency_stamp(*role).into(),
                role.description().into(),
                true.into(),
            ])
            .map_err(|e| invalid_row("AspNetRoles", e))?;
    }

    plan.push(&insert);
    Ok(())
}

/// One subscription plan row. Limits of `None` mean unlimited.
#[derive(Debug, Clone, Copy)]
pub struct PlanSeed {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Decimal literal, inserted verbatim into `numeric(18,2)`
    pub price: &'static str,
    pub interval: BillingInterval,
    pub max_users: Option<i32>,
    pub max_contacts: Option<i32>,
    pub max_deals: Option<i32>,
    pub max_storage_mb: Option<i32>,
    pub trial_days: i32,
    pub features: &'static [&'static str],
}

const FREE_FEATURES: &[&str] = &["contacts", "deals"];
const STARTER_FEATURES: &[&str] = &["contacts", "deals", "pipelines", "activities", "email"];
const PROFESSIONAL_FEATURES: &[&str] = &[
    "contacts", "deals", "pipelines", "activities", "email", "products", "schedulers",
    "sequences", "reports",
];
const ENTERPRISE_FEATURES: &[&str] = &[
    "contacts", "deals", "pipelines", "activities", "email", "products", "schedulers",
    "sequences", "reports", "projects", "api", "sso", "audit",
];

/// The seven plans in `SortOrder`
pub const SUBSCRIPTION_PLANS: [PlanSeed; 7] = [
    PlanSeed {
        code: "FREE",
        name: "Free",
        description: "For individuals getting started",
        price: "0",
        interval: BillingInterval::None,
        max_users: Some(1),
        max_contacts: Some(100),
        max_deals: Some(10),
        max_storage_mb: Some(100),
        trial_days: 0,
        features: FREE_FEATURES,
    },
    PlanSeed {
        code: "STARTER_MONTHLY",
        name: "Starter",
        description: "For small teams, billed monthly",
        price: "29.99",
        interval: BillingInterval::Monthly,
        max_users: Some(3),
        max_contacts: Some(1_000),
        max_deals: Some(100),
        max_storage_mb: Some(1_024),
        trial_days: 14,
        features: STARTER_FEATURES,
    },
    PlanSeed {
        code: "STARTER_YEARLY",
        name: "Starter",
        description: "For small teams, billed yearly",
        price: "299.99",
        interval: BillingInterval::Yearly,
        max_users: Some(3),
        max_contacts: Some(1_000),
        max_deals: Some(100),
        max_storage_mb: Some(1_024),
        trial_days: 14,
        features: STARTER_FEATURES,
    },
    PlanSeed {
        code: "PROFESSIONAL_MONTHLY",
        name: "Professional",
        description: "For growing sales teams, billed monthly",
        price: "99.99",
        interval: BillingInterval::Monthly,
        max_users: Some(10),
        max_contacts: Some(10_000),
        max_deals: Some(1_000),
        max_storage_mb: Some(10_240),
        trial_days: 14,
        features: PROFESSIONAL_FEATURES,
    },
    PlanSeed {
        code: "PROFESSIONAL_YEARLY",
        name: "Professional",
        description: "For growing sales teams, billed yearly",
        price: "999.99",
        interval: BillingInterval::Yearly,
        max_users: Some(10),
        max_contacts: Some(10_000),
        max_deals: Some(1_000),
        max_storage_mb: Some(10_240),
        trial_days: 14,
        features: PROFESSIONAL_FEATURES,
    },
    PlanSeed {
        code: "ENTERPRISE_MONTHLY",
        name: "Enterprise",
        description: "Unlimited usage, billed monthly",
        price: "299.99",
        interval: BillingInterval::Monthly,
        max_users: None,
        max_contacts: None,
        max_deals: None,
        max_storage_mb: None,
        trial_days: 30,
        features: ENTERPRISE_FEATURES,
    },
    PlanSeed {
        code: "ENTERPRISE_YEARLY",
        name: "Enterprise",
        description: "Unlimited usage, billed yearly",
        price: "2999.99",
        interval: BillingInterval::Yearly,
        max_users: None,
        max_contacts: None,
        max_deals: None,
        max_storage_mb: None,
        trial_days: 30,
        features: ENTERPRISE_FEATURES,
    },
];

fn features_literal(features: &[&str]) -> SimpleExpr {
    // Plain identifiers only, so the JSON text never needs quote escaping
    Expr::cust(format!("'{}'", serde_json::json!(features)))
}

/// Insert the seven subscription plans into `SubscriptionPlans`
pub fn subscription_plans(plan: &mut MigrationPlan) -> Result<(), DbErr> {
    let mut insert = Query::insert();
    insert.into_table(SubscriptionPlans::Table).columns([
        SubscriptionPlans::Code,
        SubscriptionPlans::Name,
        SubscriptionPlans::Description,
        SubscriptionPlans::Price,
        SubscriptionPlans::Currency,
        SubscriptionPlans::BillingInterval,
        SubscriptionPlans::MaxUsers,
        SubscriptionPlans::MaxContacts,
        SubscriptionPlans::MaxDeals,
        SubscriptionPlans::MaxStorageMb,
        SubscriptionPlans::TrialDays,
        SubscriptionPlans::IsActive,
        SubscriptionPlans::SortOrder,
        SubscriptionPlans::Features,
    ]);

    for (sort_order, seed) in (1i32..).zip(SUBSCRIPTION_PLANS.iter()) {
        insert
            .values([
                seed.code.into(),
                seed.name.into(),
                seed.description.into(),
                Expr::cust(seed.price),
                "USD".into(),
                seed.interval.as_str().into(),
                seed.max_users.into(),
                seed.max_contacts.into(),
                seed.max_deals.into(),
                seed.max_storage_mb.into(),
                seed.trial_days.into(),
                true.into(),
                sort_order.into(),
                features_literal(seed.features),
            ])
            .map_err(|e| invalid_row("SubscriptionPlans", e))?;
    }

    plan.push(&insert);
    Ok(())
}
