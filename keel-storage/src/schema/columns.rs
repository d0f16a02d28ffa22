//! Backend-aware column definitions
//!
//! PostgreSQL gets identity columns, `now()` and `gen_random_uuid()`.
//! SQLite gets rowid-backed keys and equivalent expression defaults.

use sea_orm::sea_query::{Alias, ColumnDef, Expr, IntoIden, SimpleExpr};
use sea_orm::DbBackend;

/// Length of `EntityType` discriminator columns
pub const ENTITY_TYPE_LEN: u32 = 50;

/// Length of the `EntityStatus` column
pub const ENTITY_STATUS_LEN: u32 = 20;

/// `integer NOT NULL`, generated by the database
pub fn identity(backend: DbBackend, column: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.integer().not_null();
    if backend == DbBackend::Postgres {
        def.extra("GENERATED BY DEFAULT AS IDENTITY");
    }
    // SQLite: an `integer` primary key aliases the rowid
    def
}

/// Default expression producing a random UUID
pub fn random_uuid(backend: DbBackend) -> SimpleExpr {
    match backend {
        DbBackend::Postgres => Expr::cust("gen_random_uuid()"),
        _ => Expr::cust("(lower(hex(randomblob(16))))"),
    }
}

/// Default expression producing the current time
pub fn now(backend: DbBackend) -> SimpleExpr {
    match backend {
        DbBackend::Postgres => Expr::cust("now()"),
        _ => Expr::current_timestamp().into(),
    }
}

/// `uuid NOT NULL DEFAULT <random uuid>`
pub fn public_id(backend: DbBackend, column: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.uuid().not_null().default(random_uuid(backend));
    def
}

/// `timestamptz NOT NULL DEFAULT now()`
pub fn created_at(backend: DbBackend, column: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.timestamp_with_time_zone().not_null().default(now(backend));
    def
}

/// Nullable `timestamptz`
pub fn timestamp(column: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.timestamp_with_time_zone();
    def
}

/// `timestamptz NOT NULL` without a default
pub fn timestamp_required(column: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.timestamp_with_time_zone().not_null();
    def
}

/// `integer NOT NULL`
pub fn int(column: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.integer().not_null();
    def
}

/// Nullable `integer`, typically an optional foreign key
pub fn int_null(column: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.integer();
    def
}

/// `integer NOT NULL DEFAULT <value>`
pub fn int_default(column: impl IntoIden, value: i32) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.integer().not_null().default(value);
    def
}

/// `varchar(len) NOT NULL`
pub fn string(column: impl IntoIden, len: u32) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.string_len(len).not_null();
    def
}

/// Nullable `varchar(len)`
pub fn string_null(column: impl IntoIden, len: u32) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.string_len(len);
    def
}

/// `varchar(len) NOT NULL DEFAULT '<value>'`
pub fn string_default(column: impl IntoIden, len: u32, value: &str) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.string_len(len).not_null().default(value);
    def
}

/// Nullable `text`
pub fn text_null(column: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.text();
    def
}

/// `text NOT NULL`
pub fn text(column: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.text().not_null();
    def
}

/// `boolean NOT NULL DEFAULT <value>`
pub fn flag(column: impl IntoIden, value: bool) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.boolean().not_null().default(value);
    def
}

/// `numeric(18,2) NOT NULL DEFAULT 0`
pub fn money(backend: DbBackend, column: impl IntoIden) -> ColumnDef {
    let mut def = money_null(backend, column);
    def.not_null().default(0);
    def
}

/// Nullable `numeric(18,2)`
pub fn money_null(backend: DbBackend, column: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    if backend == DbBackend::Postgres {
        def.decimal_len(18, 2);
    } else {
        // sea-query caps SQLite decimal precision at 16
        def.custom(Alias::new("numeric(18,2)"));
    }
    def
}

/// Three-letter currency code defaulting to USD
pub fn currency(column: impl IntoIden) -> ColumnDef {
    string_default(column, 3, "USD")
}

/// Nullable `date`
pub fn date_null(column: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.date();
    def
}

/// `time NOT NULL`
pub fn time(column: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.time().not_null();
    def
}

/// Nullable `jsonb`
pub fn json_null(column: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    def.json_binary();
    def
}

/// `EntityType varchar(50) NOT NULL`
pub fn entity_type(column: impl IntoIden) -> ColumnDef {
    string(column, ENTITY_TYPE_LEN)
}

/// `EntityStatus varchar(20) NOT NULL DEFAULT 'Active'`
pub fn entity_status(column: impl IntoIden) -> ColumnDef {
    string_default(column, ENTITY_STATUS_LEN, keel_core::EntityStatus::Active.as_str())
}
