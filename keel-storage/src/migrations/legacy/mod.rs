//! The first schema design (`m20250729_*`): todo lists plus a small
//! company/contact CRM. Selectable for inspecting and reproducing older
//! databases; new databases use the current generation.

pub mod m20250729_000001_initial_create;

use crate::migration::SchemaMigration;

pub fn migrations() -> Vec<Box<dyn SchemaMigration>> {
    vec![Box::new(m20250729_000001_initial_create::Migration)]
}
