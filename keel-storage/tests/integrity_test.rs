//! Polymorphic reference and hierarchy checks against a migrated database

use keel_core::{Association, CoreError, EntityKind, EntityRef, EntityStatus, HierarchyError};
use keel_core::SchemaGeneration;
use keel_storage::integrity::{EntityResolver, HierarchyGuard};
use keel_storage::testing::TestDatabase;
use keel_storage::StorageError;

/// Two tenants, each with one organization; tenant 1 also has a product
async fn setup() -> TestDatabase {
    let db = TestDatabase::migrated(SchemaGeneration::Current).await.unwrap();
    for sql in [
        "INSERT INTO \"Tenants\" (\"Name\", \"Slug\") VALUES ('Acme', 'acme'), ('Globex', 'globex')",
        "INSERT INTO \"Organizations\" (\"TenantId\", \"Name\") VALUES (1, 'Initech'), (2, 'Hooli')",
        "INSERT INTO \"Products\" (\"TenantId\", \"Name\", \"Sku\") VALUES (1, 'Widget', 'W-1')",
    ] {
        db.execute(sql).await.unwrap();
    }
    db
}

#[tokio::test]
async fn test_attachment_to_live_row() {
    let db = setup().await;
    let resolver = EntityResolver::new(db.db());

    let org = EntityRef::new(EntityKind::Organization, 1);
    assert!(resolver.exists(1, &org).await.unwrap());
    resolver
        .validate_attachment(Association::Notes, 1, &org)
        .await
        .unwrap();

    let lifecycle = resolver.lifecycle(1, &org).await.unwrap().unwrap();
    assert_eq!(lifecycle.status, EntityStatus::Active);
    assert!(!lifecycle.is_deleted);
}

#[tokio::test]
async fn test_rows_of_other_tenants_are_invisible() {
    let db = setup().await;
    let resolver = EntityResolver::new(db.db());

    // Organization 2 belongs to tenant 2
    let foreign = EntityRef::new(EntityKind::Organization, 2);
    assert!(!resolver.exists(1, &foreign).await.unwrap());

    let err = resolver
        .validate_attachment(Association::Notes, 1, &foreign)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::TargetNotFound(target) if target == foreign));
}

#[tokio::test]
async fn test_unsupported_kind_is_rejected_before_lookup() {
    let db = setup().await;
    let resolver = EntityResolver::new(db.db());

    let org = EntityRef::new(EntityKind::Organization, 1);
    let err = resolver
        .validate_attachment(Association::Prices, 1, &org)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Domain(CoreError::UnsupportedAttachment { kind: EntityKind::Organization, .. })
    ));

    let product = EntityRef::new(EntityKind::Product, 1);
    resolver
        .validate_attachment(Association::Prices, 1, &product)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_suspended_and_deleted_rows_take_no_attachments() {
    let db = setup().await;
    let resolver = EntityResolver::new(db.db());
    let org = EntityRef::new(EntityKind::Organization, 1);

    db.execute("UPDATE \"Organizations\" SET \"EntityStatus\" = 'Suspended' WHERE \"Id\" = 1")
        .await
        .unwrap();
    let err = resolver
        .validate_attachment(Association::Labels, 1, &org)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::TargetUnavailable(_)));

    db.execute(
        "UPDATE \"Organizations\" SET \"EntityStatus\" = 'Active', \"IsDeleted\" = TRUE WHERE \"Id\" = 1",
    )
    .await
    .unwrap();
    // Soft-deleted rows still resolve, but no longer count as existing
    assert!(!resolver.exists(1, &org).await.unwrap());
    let lifecycle = resolver.lifecycle(1, &org).await.unwrap().unwrap();
    assert!(lifecycle.is_deleted);
    let err = resolver
        .validate_attachment(Association::Labels, 1, &org)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::TargetUnavailable(_)));
}

#[tokio::test]
async fn test_category_cycle_is_rejected() {
    let db = setup().await;
    db.execute(
        "INSERT INTO \"ProductCategories\" (\"TenantId\", \"Name\", \"ParentCategoryId\") VALUES \
         (1, 'Hardware', NULL), (1, 'Tools', 1), (1, 'Drills', 2)",
    )
    .await
    .unwrap();
    let guard = HierarchyGuard::new(db.db());

    guard.validate_category_parent(1, 3, Some(1)).await.unwrap();
    guard.validate_category_parent(1, 2, None).await.unwrap();

    let err = guard.validate_category_parent(1, 1, Some(3)).await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::Domain(CoreError::Hierarchy(HierarchyError::Cycle { node: 1, parent: 3 }))
    ));

    let err = guard.validate_category_parent(1, 2, Some(2)).await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::Domain(CoreError::Hierarchy(HierarchyError::SelfParent(2)))
    ));

    let err = guard.validate_category_parent(2, 1, None).await.unwrap_err();
    assert!(matches!(err, StorageError::TargetNotFound(_)));
}

#[tokio::test]
async fn test_task_depth_limit() {
    let db = setup().await;
    db.execute("INSERT INTO \"Projects\" (\"TenantId\", \"Name\") VALUES (1, 'Launch')")
        .await
        .unwrap();
    db.execute(
        "INSERT INTO \"ProjectTasks\" (\"TenantId\", \"ProjectId\", \"ParentTaskId\", \"Title\") VALUES \
         (1, 1, NULL, 'Plan'), (1, 1, 1, 'Design'), (1, 1, 2, 'Review'), (1, 1, NULL, 'Ship')",
    )
    .await
    .unwrap();

    let guard = HierarchyGuard::new(db.db());
    guard.validate_task_parent(1, 4, Some(3)).await.unwrap();

    let err = HierarchyGuard::new(db.db())
        .with_max_depth(2)
        .validate_task_parent(1, 4, Some(3))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Domain(CoreError::Hierarchy(HierarchyError::TooDeep { limit: 2, .. }))
    ));

    // Plan carries Design and Review with it: four levels under Ship
    let err = HierarchyGuard::new(db.db())
        .with_max_depth(3)
        .validate_task_parent(1, 1, Some(4))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Domain(CoreError::Hierarchy(HierarchyError::TooDeep { depth: 4, limit: 3 }))
    ));
}

#[tokio::test]
async fn test_reschedule_chain() {
    let db = setup().await;
    db.execute("INSERT INTO \"Schedulers\" (\"TenantId\", \"Name\", \"Slug\") VALUES (1, 'Demo', 'demo')")
        .await
        .unwrap();
    db.execute(
        "INSERT INTO \"SchedulerBookings\" \
         (\"TenantId\", \"SchedulerId\", \"StartsAt\", \"EndsAt\", \"AttendeeName\", \"AttendeeEmail\") VALUES \
         (1, 1, '2025-10-01 09:00:00+00:00', '2025-10-01 09:30:00+00:00', 'Ann', 'ann@example.com'), \
         (1, 1, '2025-10-02 09:00:00+00:00', '2025-10-02 09:30:00+00:00', 'Ann', 'ann@example.com'), \
         (1, 1, '2025-10-03 09:00:00+00:00', '2025-10-03 09:30:00+00:00', 'Ann', 'ann@example.com')",
    )
    .await
    .unwrap();

    let guard = HierarchyGuard::new(db.db());
    guard.validate_reschedule_chain(1, 1, 2).await.unwrap();

    // Link 1 -> 2, then try to reschedule 2 back onto 1
    db.execute("UPDATE \"SchedulerBookings\" SET \"RescheduledToBookingId\" = 2 WHERE \"Id\" = 1")
        .await
        .unwrap();
    db.execute("UPDATE \"SchedulerBookings\" SET \"RescheduledFromBookingId\" = 1 WHERE \"Id\" = 2")
        .await
        .unwrap();
    guard.validate_reschedule_chain(1, 2, 3).await.unwrap();
    assert!(guard.validate_reschedule_chain(1, 2, 1).await.is_err());

    let err = guard.validate_reschedule_chain(1, 3, 99).await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::TargetNotFound(target) if target == EntityRef::new(EntityKind::SchedulerBooking, 99)
    ));
}
