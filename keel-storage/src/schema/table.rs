use sea_orm::sea_query::{
    Alias, ColumnDef, DynIden, ForeignKey, ForeignKeyAction, Index, IndexCreateStatement,
    IntoIden, Table, TableCreateStatement,
};
use sea_orm::DbBackend;

use super::{columns, naming, Common};
use crate::migration::MigrationPlan;

/// Table holding tenants; every tenant-scoped row points here
pub const TENANTS: &str = "Tenants";

/// Identity user table; audit and ownership columns point here
pub const USERS: &str = "AspNetUsers";

/// Builder for one `CREATE TABLE` plus its indexes.
///
/// Foreign keys are declared inline (SQLite cannot add them later) and each
/// gets a supporting index. Non-unique indexes are separate statements.
pub struct EntityTable {
    backend: DbBackend,
    name: String,
    table: DynIden,
    create: TableCreateStatement,
    indexes: Vec<(String, IndexCreateStatement)>,
}

impl EntityTable {
    /// A table keyed by an identity `Id`
    pub fn new(plan: &MigrationPlan, table: impl IntoIden) -> Self {
        let mut this = Self::bare(plan.backend(), table);
        let mut id = columns::identity(this.backend, Common::Id);
        this.create.col(&mut id).primary_key(
            Index::create()
                .name(naming::primary_key(&this.name))
                .col(Common::Id),
        );
        this
    }

    /// A table keyed by a composite natural key (join tables)
    pub fn keyed<I: IntoIden>(
        plan: &MigrationPlan,
        table: impl IntoIden,
        key: impl IntoIterator<Item = I>,
    ) -> Self {
        let mut this = Self::bare(plan.backend(), table);
        let mut pk = Index::create();
        pk.name(naming::primary_key(&this.name));
        for column in key {
            pk.col(column.into_iden());
        }
        this.create.primary_key(&mut pk);
        this
    }

    fn bare(backend: DbBackend, table: impl IntoIden) -> Self {
        let table = table.into_iden();
        let name = table.to_string();
        let mut create = Table::create();
        create.table(table.clone());
        Self {
            backend,
            name,
            table,
            create,
            indexes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column(mut self, mut def: ColumnDef) -> Self {
        self.create.col(&mut def);
        self
    }

    /// `PublicId uuid` with its unique index
    pub fn public_id(self) -> Self {
        let def = columns::public_id(self.backend, Common::PublicId);
        self.column(def).unique_index([Common::PublicId])
    }

    /// `TenantId` referencing `Tenants`, removed with its tenant
    pub fn tenant_scoped(self) -> Self {
        self.column(columns::int(Common::TenantId)).foreign_key(
            Common::TenantId,
            Alias::new(TENANTS),
            ForeignKeyAction::Cascade,
        )
    }

    /// `Created` and `CreatedBy`
    pub fn created(self) -> Self {
        let created = columns::created_at(self.backend, Common::Created);
        self.column(created)
            .column(columns::int_null(Common::CreatedBy))
            .foreign_key(Common::CreatedBy, Alias::new(USERS), ForeignKeyAction::SetNull)
    }

    /// `Created`, `CreatedBy`, `LastModified` and `LastModifiedBy`
    pub fn audited(self) -> Self {
        self.created()
            .column(columns::timestamp(Common::LastModified))
            .column(columns::int_null(Common::LastModifiedBy))
            .foreign_key(
                Common::LastModifiedBy,
                Alias::new(USERS),
                ForeignKeyAction::SetNull,
            )
    }

    /// `IsDeleted`, `DeletedAt` and `DeletedBy`
    pub fn soft_delete(self) -> Self {
        self.column(columns::flag(Common::IsDeleted, false))
            .column(columns::timestamp(Common::DeletedAt))
            .column(columns::int_null(Common::DeletedBy))
            .foreign_key(Common::DeletedBy, Alias::new(USERS), ForeignKeyAction::SetNull)
    }

    /// `EntityType` / `EntityId` pair of a polymorphic attachment table
    pub fn polymorphic(self) -> Self {
        self.column(columns::entity_type(Common::EntityType))
            .column(columns::int(Common::EntityId))
            .index([Common::TenantId, Common::EntityType, Common::EntityId])
    }

    /// Foreign key on `column` referencing `ref_table.Id`, plus an index on `column`
    pub fn foreign_key(
        mut self,
        column: impl IntoIden,
        ref_table: impl IntoIden,
        on_delete: ForeignKeyAction,
    ) -> Self {
        let column = column.into_iden();
        let ref_table = ref_table.into_iden();
        let name = naming::foreign_key(&self.name, &ref_table.to_string(), &column.to_string());

        self.create.foreign_key(
            ForeignKey::create()
                .name(name)
                .from(self.table.clone(), column.clone())
                .to(ref_table, Common::Id)
                .on_delete(on_delete),
        );
        self.index([column])
    }

    pub fn index<I: IntoIden>(self, columns: impl IntoIterator<Item = I>) -> Self {
        self.add_index(None, columns, false)
    }

    pub fn unique_index<I: IntoIden>(self, columns: impl IntoIterator<Item = I>) -> Self {
        self.add_index(None, columns, true)
    }

    /// Index with a name that does not follow `IX_<Table>_<Columns>`
    pub fn named_index<I: IntoIden>(
        self,
        name: &str,
        columns: impl IntoIterator<Item = I>,
        unique: bool,
    ) -> Self {
        self.add_index(Some(name.to_string()), columns, unique)
    }

    fn add_index<I: IntoIden>(
        mut self,
        name: Option<String>,
        columns: impl IntoIterator<Item = I>,
        unique: bool,
    ) -> Self {
        let columns: Vec<DynIden> = columns.into_iter().map(IntoIden::into_iden).collect();
        let name = name.unwrap_or_else(|| {
            let column_names: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
            naming::index(&self.name, &column_names)
        });

        if self.indexes.iter().any(|(existing, _)| *existing == name) {
            return self;
        }

        let mut index = Index::create();
        index.name(name.clone()).table(self.table.clone());
        for column in columns {
            index.col(column);
        }
        if unique {
            index.unique();
        }
        self.indexes.push((name, index));
        self
    }

    /// Emit the `CREATE TABLE` followed by its indexes
    pub fn create(self, plan: &mut MigrationPlan) {
        plan.push(&self.create);
        for (_, index) in &self.indexes {
            plan.push(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::table_idens;

    table_idens! {
        Gadgets { Name, ParentGadgetId }
    }

    fn sql(backend: DbBackend) -> Vec<String> {
        let mut plan = MigrationPlan::new(backend);
        EntityTable::new(&plan, Gadgets::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::string(Gadgets::Name, 100))
            .column(columns::int_null(Gadgets::ParentGadgetId))
            .foreign_key(Gadgets::ParentGadgetId, Gadgets::Table, ForeignKeyAction::NoAction)
            .audited()
            .soft_delete()
            .unique_index([Gadgets::TenantId, Gadgets::Name])
            .index([Gadgets::TenantId])
            .create(&mut plan);
        plan.sql()
    }

    #[test]
    fn test_create_then_indexes() {
        let statements = sql(DbBackend::Postgres);
        assert!(statements[0].starts_with("CREATE TABLE \"Gadgets\""));
        assert!(statements[0].contains("\"PK_Gadgets\""));
        assert!(statements[0].contains("PRIMARY KEY"));
        assert!(statements[0].contains("FK_Gadgets_Tenants_TenantId"));
        assert!(statements[0].contains("FK_Gadgets_Gadgets_ParentGadgetId"));
        assert!(statements[0].contains("FK_Gadgets_AspNetUsers_DeletedBy"));
        assert!(statements[0].contains("ON DELETE CASCADE"));
        assert!(statements[0].contains("ON DELETE SET NULL"));
        assert!(statements[0].contains("ON DELETE NO ACTION"));

        let indexes = &statements[1..];
        assert!(indexes.iter().all(|s| s.starts_with("CREATE")));
        assert!(indexes.iter().any(|s| s.contains("UNIQUE") && s.contains("IX_Gadgets_PublicId")));
        assert!(indexes.iter().any(|s| s.contains("UNIQUE") && s.contains("IX_Gadgets_TenantId_Name")));
        // The tenant index from the foreign key is not emitted twice
        assert_eq!(
            indexes.iter().filter(|s| s.contains("\"IX_Gadgets_TenantId\"")).count(),
            1
        );
    }

    #[test]
    fn test_sqlite_rendering() {
        let statements = sql(DbBackend::Sqlite);
        assert!(statements[0].contains("(lower(hex(randomblob(16))))"));
        assert!(!statements[0].contains("IDENTITY"));
        assert!(statements[0].contains("FOREIGN KEY"));
    }
}
