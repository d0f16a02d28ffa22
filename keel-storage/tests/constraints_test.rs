//! Constraint behaviour of the migrated schemas, checked against SQLite

use keel_core::SchemaGeneration;
use keel_storage::testing::TestDatabase;
use sea_orm::{ConnectionTrait, Statement};

async fn current() -> TestDatabase {
    TestDatabase::migrated(SchemaGeneration::Current).await.unwrap()
}

/// A user, and a tenant created by that user
async fn tenant_with_owner(db: &TestDatabase) {
    db.execute("INSERT INTO \"AspNetUsers\" (\"UserName\", \"NormalizedUserName\") VALUES ('alice', 'ALICE')")
        .await
        .unwrap();
    db.execute("INSERT INTO \"Tenants\" (\"Name\", \"Slug\", \"CreatedBy\") VALUES ('Acme', 'acme', 1)")
        .await
        .unwrap();
}

async fn integers(db: &TestDatabase, sql: &str) -> Vec<i64> {
    let backend = db.db().get_database_backend();
    db.db()
        .query_all(Statement::from_string(backend, sql))
        .await
        .unwrap()
        .iter()
        .map(|row| row.try_get::<i64>("", "value").unwrap())
        .collect()
}

async fn strings(db: &TestDatabase, sql: &str) -> Vec<String> {
    let backend = db.db().get_database_backend();
    db.db()
        .query_all(Statement::from_string(backend, sql))
        .await
        .unwrap()
        .iter()
        .map(|row| row.try_get::<String>("", "value").unwrap())
        .collect()
}

#[tokio::test]
async fn test_defaults_apply_when_omitted() {
    let db = current().await;
    tenant_with_owner(&db).await;

    let is_active = db
        .scalar("SELECT \"IsActive\" AS value FROM \"AspNetUsers\" WHERE \"Id\" = 1")
        .await
        .unwrap();
    assert_eq!(is_active, Some(1));

    let age_seconds = db
        .scalar(
            "SELECT CAST((julianday('now') - julianday(\"Created\")) * 86400 AS INTEGER) AS value \
             FROM \"Tenants\" WHERE \"Id\" = 1",
        )
        .await
        .unwrap()
        .unwrap();
    assert!((0..60).contains(&age_seconds), "Created is {}s old", age_seconds);

    let defaults = strings(
        &db,
        "SELECT \"Currency\" || '/' || \"TimeZone\" || '/' || \"EntityStatus\" AS value FROM \"Tenants\"",
    )
    .await;
    assert_eq!(defaults, vec!["USD/UTC/Active"]);

    let not_deleted = db
        .scalar("SELECT \"IsDeleted\" AS value FROM \"Tenants\"")
        .await
        .unwrap();
    assert_eq!(not_deleted, Some(0));

    let public_ids = db
        .scalar("SELECT COUNT(DISTINCT \"PublicId\") AS value FROM \"Tenants\" WHERE \"PublicId\" IS NOT NULL")
        .await
        .unwrap();
    assert_eq!(public_ids, Some(1));
}

#[tokio::test]
async fn test_not_null_columns_reject_null() {
    let db = current().await;

    assert!(db
        .execute("INSERT INTO \"Tenants\" (\"Slug\") VALUES ('nameless')")
        .await
        .is_err());
    assert!(db
        .execute("INSERT INTO \"Tenants\" (\"Name\", \"Slug\", \"IsDeleted\") VALUES ('Acme', 'acme', NULL)")
        .await
        .is_err());
    assert_eq!(db.count("Tenants").await.unwrap(), 0);
}

#[tokio::test]
async fn test_unique_public_id() {
    let db = current().await;
    tenant_with_owner(&db).await;

    let duplicate = db
        .execute(
            "INSERT INTO \"Tenants\" (\"Name\", \"Slug\", \"PublicId\") \
             SELECT 'Other', 'other', \"PublicId\" FROM \"Tenants\" WHERE \"Id\" = 1",
        )
        .await;
    assert!(duplicate.is_err());
    assert_eq!(db.count("Tenants").await.unwrap(), 1);
}

#[tokio::test]
async fn test_unique_tenant_membership() {
    let db = current().await;
    tenant_with_owner(&db).await;

    db.execute("INSERT INTO \"TenantUsers\" (\"TenantId\", \"ApplicationUserId\", \"IsOwner\") VALUES (1, 1, TRUE)")
        .await
        .unwrap();
    assert!(db
        .execute("INSERT INTO \"TenantUsers\" (\"TenantId\", \"ApplicationUserId\") VALUES (1, 1)")
        .await
        .is_err());
    assert_eq!(db.count("TenantUsers").await.unwrap(), 1);
}

#[tokio::test]
async fn test_legacy_cascade_removes_todo_items() {
    let db = TestDatabase::migrated(SchemaGeneration::Legacy).await.unwrap();

    db.execute("INSERT INTO \"Tenants\" (\"Name\") VALUES ('Acme')").await.unwrap();
    db.execute("INSERT INTO \"TodoLists\" (\"TenantId\", \"Title\") VALUES (1, 'Groceries')")
        .await
        .unwrap();
    db.execute(
        "INSERT INTO \"TodoItems\" (\"TenantId\", \"ListId\", \"Title\") VALUES (1, 1, 'Milk'), (1, 1, 'Bread')",
    )
    .await
    .unwrap();
    assert_eq!(db.count("TodoItems").await.unwrap(), 2);

    db.execute("DELETE FROM \"TodoLists\" WHERE \"Id\" = 1").await.unwrap();
    assert_eq!(db.count("TodoItems").await.unwrap(), 0);
}

#[tokio::test]
async fn test_set_null_on_deleted_creator() {
    let db = current().await;
    tenant_with_owner(&db).await;

    db.execute("DELETE FROM \"AspNetUsers\" WHERE \"Id\" = 1").await.unwrap();

    assert_eq!(db.count("Tenants").await.unwrap(), 1);
    let created_by = db
        .scalar("SELECT \"CreatedBy\" AS value FROM \"Tenants\" WHERE \"Id\" = 1")
        .await
        .unwrap();
    assert_eq!(created_by, None);
}

#[tokio::test]
async fn test_pipeline_with_deals_cannot_be_deleted() {
    let db = current().await;
    tenant_with_owner(&db).await;

    db.execute("INSERT INTO \"Pipelines\" (\"TenantId\", \"Name\") VALUES (1, 'Sales')")
        .await
        .unwrap();
    db.execute("INSERT INTO \"PipelineStages\" (\"TenantId\", \"PipelineId\", \"Name\", \"SortOrder\") VALUES (1, 1, 'Qualified', 1)")
        .await
        .unwrap();
    db.execute(
        "INSERT INTO \"Deals\" (\"TenantId\", \"Title\", \"PipelineId\", \"PipelineStageId\") VALUES (1, 'Renewal', 1, 1)",
    )
    .await
    .unwrap();

    assert!(db.execute("DELETE FROM \"Pipelines\" WHERE \"Id\" = 1").await.is_err());
    assert_eq!(db.count("Pipelines").await.unwrap(), 1);
    assert_eq!(db.count("PipelineStages").await.unwrap(), 1);

    // Removing the tenant still takes everything with it
    db.execute("DELETE FROM \"Tenants\" WHERE \"Id\" = 1").await.unwrap();
    assert_eq!(db.count("Deals").await.unwrap(), 0);
    assert_eq!(db.count("Pipelines").await.unwrap(), 0);
    assert_eq!(db.count("PipelineStages").await.unwrap(), 0);
}

#[tokio::test]
async fn test_plan_in_use_cannot_be_deleted() {
    let db = current().await;
    tenant_with_owner(&db).await;

    db.execute("INSERT INTO \"Subscriptions\" (\"TenantId\", \"SubscriptionPlanId\") VALUES (1, 2)")
        .await
        .unwrap();
    assert!(db
        .execute("DELETE FROM \"SubscriptionPlans\" WHERE \"Id\" = 2")
        .await
        .is_err());
    assert_eq!(db.count("SubscriptionPlans").await.unwrap(), 7);
}

#[tokio::test]
async fn test_role_seed() {
    for generation in [SchemaGeneration::Legacy, SchemaGeneration::Current] {
        let db = TestDatabase::migrated(generation).await.unwrap();

        let names = strings(&db, "SELECT \"Name\" AS value FROM \"AspNetRoles\" ORDER BY \"Id\"").await;
        assert_eq!(names, vec!["SuperAdmin", "TenantAdmin", "NonTenantAdmin"]);

        let normalized = strings(
            &db,
            "SELECT \"NormalizedName\" AS value FROM \"AspNetRoles\" ORDER BY \"Id\"",
        )
        .await;
        assert_eq!(normalized, vec!["SUPERADMIN", "TENANTADMIN", "NONTENANTADMIN"]);

        let system = db
            .scalar("SELECT COUNT(*) AS value FROM \"AspNetRoles\" WHERE \"IsSystemRole\"")
            .await
            .unwrap();
        assert_eq!(system, Some(3));
    }
}

#[tokio::test]
async fn test_subscription_plan_seed() {
    let db = current().await;

    assert_eq!(db.count("SubscriptionPlans").await.unwrap(), 7);

    let cents = integers(
        &db,
        "SELECT CAST(ROUND(\"Price\" * 100) AS INTEGER) AS value FROM \"SubscriptionPlans\" ORDER BY \"SortOrder\"",
    )
    .await;
    assert_eq!(cents, vec![0, 2999, 29999, 9999, 99999, 29999, 299999]);

    let currencies = strings(&db, "SELECT DISTINCT \"Currency\" AS value FROM \"SubscriptionPlans\"").await;
    assert_eq!(currencies, vec!["USD"]);

    let features = strings(
        &db,
        "SELECT \"Features\" AS value FROM \"SubscriptionPlans\" WHERE \"Code\" = 'FREE'",
    )
    .await;
    assert_eq!(features, vec!["[\"contacts\",\"deals\"]"]);
}
