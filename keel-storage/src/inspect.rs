//! Read a live schema back into a comparable snapshot
//!
//! PostgreSQL is read from `pg_catalog`, SQLite from `sqlite_master` and the
//! table-valued `PRAGMA` functions. Both produce the same [`SchemaSnapshot`]
//! shape; type names and default expressions are kept as the database
//! reports them.

use std::collections::BTreeMap;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, QueryResult, Statement, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::migration::DEFAULT_HISTORY_TABLE;
use crate::schema::naming;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSnapshot {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    /// Generated by the database (identity column or SQLite rowid alias)
    pub identity: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub unique: bool,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeySnapshot {
    /// Constraint name. SQLite does not report one, so it is rebuilt from
    /// the `FK_<Table>_<RefTable>_<Column>` convention.
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub on_delete: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub columns: Vec<ColumnSnapshot>,
    pub primary_key: Vec<String>,
    pub indexes: BTreeMap<String, IndexSnapshot>,
    pub foreign_keys: Vec<ForeignKeySnapshot>,
}

impl TableSnapshot {
    pub fn column(&self, name: &str) -> Option<&ColumnSnapshot> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn foreign_key_on(&self, column: &str) -> Option<&ForeignKeySnapshot> {
        self.foreign_keys
            .iter()
            .find(|fk| fk.columns.len() == 1 && fk.columns[0] == column)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub tables: BTreeMap<String, TableSnapshot>,
}

impl SchemaSnapshot {
    pub fn table(&self, name: &str) -> Option<&TableSnapshot> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Foreign keys whose referenced table is missing, as `table.constraint`
    pub fn dangling_foreign_keys(&self) -> Vec<String> {
        self.tables
            .iter()
            .flat_map(|(table, snapshot)| {
                snapshot
                    .foreign_keys
                    .iter()
                    .filter(|fk| !self.tables.contains_key(&fk.referenced_table))
                    .map(move |fk| format!("{}.{}", table, fk.name))
            })
            .collect()
    }
}

/// Reads the schema visible through one connection
pub struct SchemaInspector<'a> {
    db: &'a DatabaseConnection,
    excluded: Vec<String>,
}

impl<'a> SchemaInspector<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            db,
            excluded: vec![DEFAULT_HISTORY_TABLE.to_string()],
        }
    }

    /// Leave a table out of snapshots, e.g. a renamed history table
    pub fn excluding(mut self, table: impl Into<String>) -> Self {
        self.excluded.push(table.into());
        self
    }

    pub async fn snapshot(&self) -> Result<SchemaSnapshot, DbErr> {
        let backend = self.db.get_database_backend();
        let mut snapshot = SchemaSnapshot::default();

        for table in self.table_names(backend).await? {
            if self.excluded.contains(&table) {
                continue;
            }
            let table_snapshot = match backend {
                DbBackend::Postgres => self.postgres_table(&table).await?,
                DbBackend::Sqlite => self.sqlite_table(&table).await?,
                other => {
                    return Err(DbErr::Custom(format!("{:?} is not supported", other)));
                }
            };
            snapshot.tables.insert(table, table_snapshot);
        }

        debug!("Inspected {} tables", snapshot.tables.len());
        Ok(snapshot)
    }

    async fn table_names(&self, backend: DbBackend) -> Result<Vec<String>, DbErr> {
        let sql = match backend {
            DbBackend::Postgres => {
                "SELECT c.relname::text AS name \
                 FROM pg_catalog.pg_class c \
                 JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
                 WHERE c.relkind = 'r' AND n.nspname = current_schema() \
                 ORDER BY 1"
            }
            _ => {
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
                 ORDER BY name"
            }
        };

        let rows = self
            .db
            .query_all(Statement::from_string(backend, sql))
            .await?;
        rows.iter().map(|row| row.try_get("", "name")).collect()
    }

    async fn query(&self, sql: &str, table: &str) -> Result<Vec<QueryResult>, DbErr> {
        let backend = self.db.get_database_backend();
        let values: [Value; 1] = [table.into()];
        self.db
            .query_all(Statement::from_sql_and_values(backend, sql, values))
            .await
    }

    async fn sqlite_table(&self, table: &str) -> Result<TableSnapshot, DbErr> {
        let mut snapshot = TableSnapshot::default();

        let rows = self
            .query(
                "SELECT name, type, \"notnull\" AS not_null, dflt_value, pk \
                 FROM pragma_table_info(?) ORDER BY cid",
                table,
            )
            .await?;
        let mut key: Vec<(i64, String)> = Vec::new();
        for row in &rows {
            let name: String = row.try_get("", "name")?;
            let data_type: String = row.try_get("", "type")?;
            let not_null: i64 = row.try_get("", "not_null")?;
            let pk: i64 = row.try_get("", "pk")?;
            if pk > 0 {
                key.push((pk, name.clone()));
            }
            snapshot.columns.push(ColumnSnapshot {
                name,
                data_type,
                nullable: not_null == 0,
                default: row.try_get("", "dflt_value")?,
                identity: false,
            });
        }
        key.sort();
        snapshot.primary_key = key.into_iter().map(|(_, name)| name).collect();

        // A lone `integer` primary key aliases the rowid
        if let [only] = snapshot.primary_key.as_slice() {
            if let Some(column) = snapshot.columns.iter_mut().find(|c| &c.name == only) {
                column.identity = column.data_type.eq_ignore_ascii_case("integer");
            }
        }

        let rows = self
            .query(
                "SELECT name, \"unique\" AS is_unique FROM pragma_index_list(?) \
                 WHERE origin IN ('c', 'u') ORDER BY name",
                table,
            )
            .await?;
        for row in &rows {
            let name: String = row.try_get("", "name")?;
            let unique: i64 = row.try_get("", "is_unique")?;
            let columns = self
                .query("SELECT name FROM pragma_index_info(?) ORDER BY seqno", &name)
                .await?
                .iter()
                .map(|r| r.try_get("", "name"))
                .collect::<Result<Vec<String>, DbErr>>()?;
            snapshot.indexes.insert(
                name,
                IndexSnapshot {
                    unique: unique != 0,
                    columns,
                },
            );
        }

        let rows = self
            .query(
                "SELECT id, \"table\" AS referenced_table, \"from\" AS column_name, \
                 \"to\" AS referenced_column, on_delete \
                 FROM pragma_foreign_key_list(?) ORDER BY id, seq",
                table,
            )
            .await?;
        let mut by_id: BTreeMap<i64, ForeignKeySnapshot> = BTreeMap::new();
        for row in &rows {
            let id: i64 = row.try_get("", "id")?;
            let column: String = row.try_get("", "column_name")?;
            let referenced: Option<String> = row.try_get("", "referenced_column")?;
            let referenced_table: String = row.try_get("", "referenced_table")?;
            let on_delete: String = row.try_get("", "on_delete")?;

            let fk = by_id.entry(id).or_insert_with(|| ForeignKeySnapshot {
                name: String::new(),
                columns: Vec::new(),
                referenced_table,
                referenced_columns: Vec::new(),
                on_delete,
            });
            fk.columns.push(column);
            fk.referenced_columns
                .push(referenced.unwrap_or_else(|| "Id".to_string()));
        }
        for mut fk in by_id.into_values() {
            fk.name = naming::foreign_key(table, &fk.referenced_table, &fk.columns.join("_"));
            snapshot.foreign_keys.push(fk);
        }
        snapshot.foreign_keys.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(snapshot)
    }

    async fn postgres_table(&self, table: &str) -> Result<TableSnapshot, DbErr> {
        let mut snapshot = TableSnapshot::default();

        let rows = self
            .query(
                "SELECT a.attname::text AS name, \
                        pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type, \
                        NOT a.attnotnull AS nullable, \
                        pg_catalog.pg_get_expr(d.adbin, d.adrelid) AS column_default, \
                        a.attidentity::text AS identity \
                 FROM pg_catalog.pg_attribute a \
                 LEFT JOIN pg_catalog.pg_attrdef d \
                        ON d.adrelid = a.attrelid AND d.adnum = a.attnum \
                 WHERE a.attrelid = format('%I', $1::text)::regclass \
                   AND a.attnum > 0 AND NOT a.attisdropped \
                 ORDER BY a.attnum",
                table,
            )
            .await?;
        for row in &rows {
            let identity: String = row.try_get("", "identity")?;
            snapshot.columns.push(ColumnSnapshot {
                name: row.try_get("", "name")?,
                data_type: row.try_get("", "data_type")?,
                nullable: row.try_get("", "nullable")?,
                default: row.try_get("", "column_default")?,
                identity: !identity.is_empty(),
            });
        }

        let rows = self
            .query(
                "SELECT i.relname::text AS name, \
                        ix.indisunique AS is_unique, \
                        ix.indisprimary AS is_primary, \
                        array_to_string(array_agg(a.attname::text ORDER BY k.ord), ',') AS columns \
                 FROM pg_catalog.pg_index ix \
                 JOIN pg_catalog.pg_class i ON i.oid = ix.indexrelid \
                 CROSS JOIN LATERAL unnest(ix.indkey::int2[]) WITH ORDINALITY AS k(attnum, ord) \
                 JOIN pg_catalog.pg_attribute a \
                        ON a.attrelid = ix.indrelid AND a.attnum = k.attnum \
                 WHERE ix.indrelid = format('%I', $1::text)::regclass \
                 GROUP BY i.relname, ix.indisunique, ix.indisprimary \
                 ORDER BY 1",
                table,
            )
            .await?;
        for row in &rows {
            let columns = split_list(&row.try_get::<String>("", "columns")?);
            if row.try_get::<bool>("", "is_primary")? {
                snapshot.primary_key = columns;
                continue;
            }
            snapshot.indexes.insert(
                row.try_get("", "name")?,
                IndexSnapshot {
                    unique: row.try_get("", "is_unique")?,
                    columns,
                },
            );
        }

        let rows = self
            .query(
                "SELECT con.conname::text AS name, \
                        ref.relname::text AS referenced_table, \
                        con.confdeltype::text AS on_delete, \
                        array_to_string(ARRAY( \
                            SELECT a.attname::text \
                            FROM unnest(con.conkey) WITH ORDINALITY AS k(attnum, ord) \
                            JOIN pg_catalog.pg_attribute a \
                                 ON a.attrelid = con.conrelid AND a.attnum = k.attnum \
                            ORDER BY k.ord), ',') AS columns, \
                        array_to_string(ARRAY( \
                            SELECT a.attname::text \
                            FROM unnest(con.confkey) WITH ORDINALITY AS k(attnum, ord) \
                            JOIN pg_catalog.pg_attribute a \
                                 ON a.attrelid = con.confrelid AND a.attnum = k.attnum \
                            ORDER BY k.ord), ',') AS referenced_columns \
                 FROM pg_catalog.pg_constraint con \
                 JOIN pg_catalog.pg_class ref ON ref.oid = con.confrelid \
                 WHERE con.contype = 'f' \
                   AND con.conrelid = format('%I', $1::text)::regclass \
                 ORDER BY 1",
                table,
            )
            .await?;
        for row in &rows {
            let action: String = row.try_get("", "on_delete")?;
            snapshot.foreign_keys.push(ForeignKeySnapshot {
                name: row.try_get("", "name")?,
                columns: split_list(&row.try_get::<String>("", "columns")?),
                referenced_table: row.try_get("", "referenced_table")?,
                referenced_columns: split_list(&row.try_get::<String>("", "referenced_columns")?),
                on_delete: delete_action(&action).to_string(),
            });
        }

        Ok(snapshot)
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `pg_constraint.confdeltype` codes
fn delete_action(code: &str) -> &'static str {
    match code {
        "r" => "RESTRICT",
        "c" => "CASCADE",
        "n" => "SET NULL",
        "d" => "SET DEFAULT",
        _ => "NO ACTION",
    }
}
