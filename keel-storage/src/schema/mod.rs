//! Building blocks shared by every migration
//!
//! Identifiers are PascalCase and quoted exactly as written. Every table
//! follows the same conventions: an identity `Id` behind `PK_<Table>`,
//! foreign keys named `FK_<Table>_<RefTable>_<Column>` and indexes named
//! `IX_<Table>_<Columns>`.

pub mod columns;
pub mod naming;
pub mod table;

pub use table::EntityTable;

use sea_orm::sea_query::Iden;

/// Declare one identifier enum per table.
///
/// Each enum gets a `Table` variant rendering the table name, the columns
/// listed, and the conventional columns (`Id`, `TenantId`, audit, soft delete
/// and lifecycle) so that indexes can mix them freely.
macro_rules! table_idens {
    ($($table:ident { $($column:ident),* $(,)? })*) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub enum $table {
                Table,
                Id,
                PublicId,
                TenantId,
                Created,
                CreatedBy,
                LastModified,
                LastModifiedBy,
                IsDeleted,
                DeletedAt,
                DeletedBy,
                EntityStatus,
                SuspendedAt,
                ResumedAt,
                $($column,)*
            }

            impl ::sea_orm::sea_query::Iden for $table {
                fn unquoted(&self, s: &mut dyn ::std::fmt::Write) {
                    let _ = match self {
                        Self::Table => s.write_str(stringify!($table)),
                        column => write!(s, "{:?}", column),
                    };
                }
            }
        )*
    };
}

pub(crate) use table_idens;

/// Conventional column names, for code that works on any table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Common {
    Id,
    PublicId,
    TenantId,
    Created,
    CreatedBy,
    LastModified,
    LastModifiedBy,
    IsDeleted,
    DeletedAt,
    DeletedBy,
    EntityStatus,
    SuspendedAt,
    ResumedAt,
    EntityType,
    EntityId,
}

impl Iden for Common {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        let _ = write!(s, "{:?}", self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    table_idens! {
        Widgets { Name, SortOrder }
    }

    #[test]
    fn test_idens_keep_pascal_case() {
        assert_eq!(Widgets::Table.to_string(), "Widgets");
        assert_eq!(Widgets::SortOrder.to_string(), "SortOrder");
        assert_eq!(Widgets::TenantId.to_string(), "TenantId");
        assert_eq!(Common::EntityStatus.to_string(), "EntityStatus");
    }
}
