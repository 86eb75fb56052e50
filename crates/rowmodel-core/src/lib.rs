//! Core types for rowmodel.
//!
//! `rowmodel-core` is the foundation layer for the workspace. It defines the
//! typed-column value system, the schema registry, and the error taxonomy
//! that every other crate builds on.
//!
//! # Role In The Architecture
//!
//! - **Value system**: [`Value`], [`ColumnKind`], [`ColumnConstraints`], and
//!   [`ColumnValue`] carry typed, constrained, change-tracked attribute
//!   slots.
//! - **Schema registry**: [`Descriptor`], the [`Model`] trait, and
//!   [`schema_of`] merge a model's parent chain into one flat, ordered,
//!   process-wide-cached [`Schema`].
//! - **Error taxonomy**: [`Error`] and [`Result`] surface validation and
//!   storage failures explicitly instead of unwinding.
//!
//! # Who Uses This Crate
//!
//! - `rowmodel-schema` renders DDL from [`Schema`].
//! - `rowmodel-query` renders DML and filter predicates from [`Schema`] and
//!   live [`ColumnValue`] state.
//! - The `rowmodel` facade binds schemas to row instances and drives the
//!   storage connection.
//!
//! Most applications should depend on the `rowmodel` facade instead of this
//! crate directly.

pub mod column;
pub mod error;
pub mod schema;
pub mod sql;
pub mod timestamp;
pub mod value;

pub use column::{ColumnConstraints, ColumnKind, ColumnValue, ForeignKey};
pub use error::{Error, Result};
pub use schema::{
    Descriptor, DescriptorFn, ID_COLUMN, Model, Schema, TableIdentity, base_descriptor, schema_of,
};
pub use sql::normalize_statement;
pub use value::Value;
