//! DDL rendering: create and drop table statements.
//!
//! The emitted dialect is deliberately small and lowercase: type tokens are
//! `integer`/`real`/`text`, constraint tokens are `primary key`, `not null`,
//! and `references <table>(<column>)`, space-joined in that order.

use rowmodel_core::column::ColumnValue;
use rowmodel_core::schema::Schema;
use rowmodel_core::sql::normalize_statement;

/// Render `create table if not exists <name> (...)` for a schema.
///
/// Columns appear in the schema's stable order, each as
/// `<name> <type> <constraints>` with the constraint subset that applies.
#[must_use]
pub fn create_table(schema: &Schema) -> String {
    let columns: Vec<String> = schema
        .columns()
        .map(|(name, template)| column_clause(name, template))
        .collect();
    let statement = normalize_statement(&format!(
        "create table if not exists {} ({})",
        schema.table_name(),
        columns.join(", ")
    ));
    tracing::debug!(table = %schema.table_name(), sql = %statement, "generated create table");
    statement
}

/// Render `drop table if exists <name>` for a schema.
#[must_use]
pub fn drop_table(schema: &Schema) -> String {
    let statement = format!("drop table if exists {}", schema.table_name());
    tracing::debug!(table = %schema.table_name(), sql = %statement, "generated drop table");
    statement
}

fn column_clause(name: &str, template: &ColumnValue) -> String {
    normalize_statement(&format!(
        "{} {} {}",
        name,
        template.kind().sql_token(),
        constraint_clause(template)
    ))
}

fn constraint_clause(template: &ColumnValue) -> String {
    let mut parts: Vec<String> = Vec::new();
    if template.is_primary_key() {
        parts.push("primary key".to_string());
    }
    if template.not_null() {
        parts.push("not null".to_string());
    }
    if let Some(fk) = template.foreign_key() {
        parts.push(format!(
            "references {}({})",
            fk.referenced_table(),
            fk.referenced_column()
        ));
    }
    parts.join(" ")
}
