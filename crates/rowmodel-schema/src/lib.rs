//! DDL rendering for rowmodel schemas.
//!
//! Pure, stateless functions mapping a merged [`Schema`](rowmodel_core::Schema)
//! to `create table` / `drop table` statements in the crate's single target
//! dialect. DML rendering lives in `rowmodel-query`.

pub mod ddl;

pub use ddl::{create_table, drop_table};
