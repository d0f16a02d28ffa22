//! Rules the database cannot enforce on its own
//!
//! Polymorphic `(EntityType, EntityId)` pairs carry no foreign key, and
//! self-referencing keys only prove that the referenced row exists. These
//! helpers check both before a write, against the rows of one tenant.

use keel_core::hierarchy::{self, ChainLink, ParentLinks, MAX_DEPTH};
use keel_core::{Association, CoreError, EntityKind, EntityRef, EntityStatus, Lifecycle};
use sea_orm::sea_query::{Alias, Expr, Query, SelectStatement};
use sea_orm::{ConnectionTrait, QueryResult};

use crate::error::{StorageError, StorageResult};
use crate::schema::Common;

async fn fetch_all<C: ConnectionTrait>(db: &C, select: &SelectStatement) -> StorageResult<Vec<QueryResult>> {
    let backend = db.get_database_backend();
    Ok(db.query_all(backend.build(select)).await?)
}

/// Resolves [`EntityRef`]s against their tables
pub struct EntityResolver<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> EntityResolver<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn select_target(tenant_id: i32, target: &EntityRef) -> SelectStatement {
        Query::select()
            .from(Alias::new(target.kind.table_name()))
            .and_where(Expr::col(Common::Id).eq(target.id))
            .and_where(Expr::col(Common::TenantId).eq(tenant_id))
            .to_owned()
    }

    /// Whether `target` is a live (not soft-deleted) row of the tenant
    pub async fn exists(&self, tenant_id: i32, target: &EntityRef) -> StorageResult<bool> {
        let mut select = Self::select_target(tenant_id, target);
        select.column(Common::Id);
        if target.kind.is_soft_deletable() {
            select.and_where(Expr::col(Common::IsDeleted).eq(false));
        }
        Ok(!fetch_all(self.db, &select).await?.is_empty())
    }

    /// Lifecycle flags of `target`, or `None` when the tenant has no such row
    pub async fn lifecycle(&self, tenant_id: i32, target: &EntityRef) -> StorageResult<Option<Lifecycle>> {
        let kind = target.kind;
        let mut select = Self::select_target(tenant_id, target);
        select.column(Common::Id);
        if kind.is_soft_deletable() {
            select.column(Common::IsDeleted);
        }
        if kind.has_lifecycle() {
            select.column(Common::EntityStatus);
        }

        let rows = fetch_all(self.db, &select).await?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };

        let mut lifecycle = Lifecycle::new();
        if kind.is_soft_deletable() {
            lifecycle.is_deleted = row.try_get("", "IsDeleted")?;
        }
        if kind.has_lifecycle() {
            let status: String = row.try_get("", "EntityStatus")?;
            lifecycle.status = status
                .parse::<EntityStatus>()
                .map_err(CoreError::from)?;
        }
        Ok(Some(lifecycle))
    }

    /// Check that a row of `association` may be attached to `target`
    pub async fn validate_attachment(
        &self,
        association: Association,
        tenant_id: i32,
        target: &EntityRef,
    ) -> StorageResult<()> {
        association.check(target)?;

        match self.lifecycle(tenant_id, target).await? {
            None => Err(StorageError::TargetNotFound(*target)),
            Some(lifecycle) if !lifecycle.accepts_new_children() => {
                Err(StorageError::TargetUnavailable(*target))
            }
            Some(_) => Ok(()),
        }
    }
}

/// Shape checks for the self-referencing tables
pub struct HierarchyGuard<'a, C: ConnectionTrait> {
    db: &'a C,
    max_depth: usize,
}

impl<'a, C: ConnectionTrait> HierarchyGuard<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self {
            db,
            max_depth: MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    async fn parent_links(&self, kind: EntityKind, parent_column: &str, tenant_id: i32) -> StorageResult<ParentLinks> {
        let select = Query::select()
            .column(Common::Id)
            .expr_as(Expr::col(Alias::new(parent_column)), Alias::new("ParentId"))
            .from(Alias::new(kind.table_name()))
            .and_where(Expr::col(Common::TenantId).eq(tenant_id))
            .to_owned();

        fetch_all(self.db, &select)
            .await?
            .iter()
            .map(|row| -> StorageResult<(i32, Option<i32>)> {
                Ok((row.try_get("", "Id")?, row.try_get("", "ParentId")?))
            })
            .collect()
    }

    async fn validate_parent(
        &self,
        kind: EntityKind,
        parent_column: &str,
        tenant_id: i32,
        id: i32,
        new_parent: Option<i32>,
    ) -> StorageResult<()> {
        let links = self.parent_links(kind, parent_column, tenant_id).await?;
        if !links.contains_key(&id) {
            return Err(StorageError::TargetNotFound(EntityRef::new(kind, id)));
        }
        hierarchy::validate_parent(id, new_parent, &links, self.max_depth).map_err(CoreError::from)?;
        Ok(())
    }

    /// Check that moving category `id` under `new_parent` keeps a tree
    pub async fn validate_category_parent(
        &self,
        tenant_id: i32,
        id: i32,
        new_parent: Option<i32>,
    ) -> StorageResult<()> {
        self.validate_parent(EntityKind::ProductCategory, "ParentCategoryId", tenant_id, id, new_parent)
            .await
    }

    /// Check that moving task `id` under `new_parent` keeps a tree
    pub async fn validate_task_parent(&self, tenant_id: i32, id: i32, new_parent: Option<i32>) -> StorageResult<()> {
        self.validate_parent(EntityKind::ProjectTask, "ParentTaskId", tenant_id, id, new_parent)
            .await
    }

    /// Check the booking chains after `original` is rescheduled to `replacement`
    pub async fn validate_reschedule_chain(&self, tenant_id: i32, original: i32, replacement: i32) -> StorageResult<()> {
        let select = Query::select()
            .columns([
                Alias::new("Id"),
                Alias::new("RescheduledFromBookingId"),
                Alias::new("RescheduledToBookingId"),
            ])
            .from(Alias::new(EntityKind::SchedulerBooking.table_name()))
            .and_where(Expr::col(Common::TenantId).eq(tenant_id))
            .to_owned();

        let mut links = fetch_all(self.db, &select)
            .await?
            .iter()
            .map(|row| -> StorageResult<ChainLink> {
                Ok(ChainLink {
                    id: row.try_get("", "Id")?,
                    from: row.try_get("", "RescheduledFromBookingId")?,
                    to: row.try_get("", "RescheduledToBookingId")?,
                })
            })
            .collect::<StorageResult<Vec<ChainLink>>>()?;

        for id in [original, replacement] {
            if !links.iter().any(|link| link.id == id) {
                return Err(StorageError::TargetNotFound(EntityRef::new(
                    EntityKind::SchedulerBooking,
                    id,
                )));
            }
        }

        for link in links.iter_mut() {
            if link.id == original {
                link.to = Some(replacement);
            }
            if link.id == replacement {
                link.from = Some(original);
            }
        }

        hierarchy::validate_chain(&links).map_err(CoreError::from)?;
        Ok(())
    }
}
