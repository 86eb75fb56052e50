//! DML rendering: select, insert, update, and delete statements.
//!
//! Insert and update operate on a schema plus the row's live column slots,
//! aligned positionally. Rendering a slot runs its autofill, so timestamp
//! columns self-populate at compile time; the caller executes the returned
//! text as-is.

use rowmodel_core::column::ColumnValue;
use rowmodel_core::error::Result;
use rowmodel_core::schema::{ID_COLUMN, Schema};
use rowmodel_core::sql::normalize_statement;

use crate::filter::{Filter, render_predicate};

/// Render `select * from <name>`, plus a `where` clause when the filter
/// yields a non-empty predicate.
pub fn select_all(schema: &Schema, filter: Option<&Filter>) -> Result<String> {
    let mut statement = format!("select * from {}", schema.table_name());
    if let Some(filter) = filter {
        let predicate = render_predicate(schema, filter)?;
        if !predicate.is_empty() {
            statement = format!("{statement} where {predicate}");
        }
    }
    let statement = normalize_statement(&statement);
    tracing::trace!(sql = %statement, "compiled select");
    Ok(statement)
}

/// Render a single-row select; same shape as [`select_all`] with the filter
/// required.
pub fn select_one(schema: &Schema, filter: &Filter) -> Result<String> {
    select_all(schema, Some(filter))
}

/// Render `insert into <name> (<columns>) values (<literals>)`.
///
/// Every column appears in schema order; autofilled slots self-populate as
/// they render, and an unset primary key renders as `null` so the store
/// assigns the rowid.
pub fn insert_row(schema: &Schema, columns: &mut [ColumnValue]) -> String {
    debug_assert_eq!(schema.len(), columns.len());
    let names: Vec<&str> = schema.columns().map(|(name, _)| name).collect();
    let literals: Vec<String> = columns
        .iter_mut()
        .map(ColumnValue::render_for_storage)
        .collect();
    let statement = normalize_statement(&format!(
        "insert into {} ({}) values ({})",
        schema.table_name(),
        names.join(", "),
        literals.join(", ")
    ));
    tracing::debug!(sql = %statement, "compiled insert");
    statement
}

/// Render `update <name> set <dirty columns> where <name>.id = <id>`.
///
/// Returns `None` when no column is dirty before rendering; the caller must
/// skip execution rather than run an empty statement. When something is
/// dirty, every slot renders (stamping autofill-on-update timestamps, which
/// join the set clause) and only dirty slots are assigned.
pub fn update_row(schema: &Schema, columns: &mut [ColumnValue]) -> Option<String> {
    debug_assert_eq!(schema.len(), columns.len());
    if !columns.iter().any(ColumnValue::is_dirty) {
        tracing::trace!(table = %schema.table_name(), "no dirty columns, no update statement");
        return None;
    }
    let id_position = schema.position(ID_COLUMN)?;

    let mut assignments: Vec<String> = Vec::new();
    for (position, column) in columns.iter_mut().enumerate() {
        let literal = column.render_for_storage();
        if column.is_dirty() && position != id_position {
            let name = schema.name_at(position).unwrap_or_default();
            assignments.push(format!("{name} = {literal}"));
        }
    }

    let table = schema.table_name();
    let id_literal = columns[id_position].render_for_storage();
    let statement = normalize_statement(&format!(
        "update {table} set {} where {table}.{ID_COLUMN} = {id_literal}",
        assignments.join(", ")
    ));
    tracing::debug!(sql = %statement, "compiled update");
    Some(statement)
}

/// Render `delete from <name>`, plus a `where` clause when the filter yields
/// a non-empty predicate.
pub fn delete_rows(schema: &Schema, filter: Option<&Filter>) -> Result<String> {
    let mut statement = format!("delete from {}", schema.table_name());
    if let Some(filter) = filter {
        let predicate = render_predicate(schema, filter)?;
        if !predicate.is_empty() {
            statement = format!("{statement} where {predicate}");
        }
    }
    let statement = normalize_statement(&statement);
    tracing::debug!(sql = %statement, "compiled delete");
    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowmodel_core::column::{ColumnConstraints, ColumnValue};
    use rowmodel_core::schema::{Descriptor, Model, base_descriptor, schema_of};
    use rowmodel_core::value::Value;

    struct Note;

    impl Model for Note {
        fn descriptor() -> Result<Descriptor> {
            Ok(Descriptor::new("notes")
                .parent(base_descriptor)
                .column("body", ColumnValue::text(ColumnConstraints::new())?))
        }
    }

    struct Stamped;

    impl Model for Stamped {
        fn descriptor() -> Result<Descriptor> {
            Ok(Descriptor::new("stamped")
                .parent(base_descriptor)
                .column(
                    "modified",
                    ColumnValue::timestamp(ColumnConstraints::new().autofill_on_update(true))?,
                ))
        }
    }

    fn live_columns(schema: &Schema) -> Vec<ColumnValue> {
        schema
            .columns()
            .map(|(_, template)| template.instantiate(None, false).unwrap())
            .collect()
    }

    #[test]
    fn test_select_all_without_filter() {
        let schema = schema_of::<Note>().unwrap();
        assert_eq!(
            select_all(&schema, None).unwrap(),
            "select * from notes"
        );
    }

    #[test]
    fn test_select_all_with_filter() {
        let schema = schema_of::<Note>().unwrap();
        let filter = Filter::new().eq("name", "todo");
        assert_eq!(
            select_all(&schema, Some(&filter)).unwrap(),
            "select * from notes where name = \"todo\""
        );
    }

    #[test]
    fn test_select_one_matches_select_shape() {
        let schema = schema_of::<Note>().unwrap();
        let filter = Filter::new().eq("id", 3);
        assert_eq!(
            select_one(&schema, &filter).unwrap(),
            "select * from notes where id = 3"
        );
    }

    #[test]
    fn test_insert_renders_every_column_in_schema_order() {
        let schema = schema_of::<Note>().unwrap();
        let mut columns = live_columns(&schema);
        columns[schema.position("name").unwrap()]
            .update(Some(Value::from("Alice")), true)
            .unwrap();
        assert_eq!(
            insert_row(&schema, &mut columns),
            "insert into notes (id, name, body) values (null, \"Alice\", null)"
        );
    }

    #[test]
    fn test_update_includes_only_dirty_columns() {
        let schema = schema_of::<Note>().unwrap();
        let mut columns = live_columns(&schema);
        columns[schema.position(ID_COLUMN).unwrap()].overwrite(Some(Value::Integer(7)));
        columns[schema.position("body").unwrap()]
            .update(Some(Value::from("hello")), true)
            .unwrap();
        assert_eq!(
            update_row(&schema, &mut columns).unwrap(),
            "update notes set body = \"hello\" where notes.id = 7"
        );
    }

    #[test]
    fn test_update_with_nothing_dirty_yields_no_statement() {
        let schema = schema_of::<Note>().unwrap();
        let mut columns = live_columns(&schema);
        columns[schema.position(ID_COLUMN).unwrap()].overwrite(Some(Value::Integer(7)));
        assert!(update_row(&schema, &mut columns).is_none());
    }

    #[test]
    fn test_update_stamps_autofill_on_update_columns() {
        let schema = schema_of::<Stamped>().unwrap();
        let mut columns = live_columns(&schema);
        columns[schema.position(ID_COLUMN).unwrap()].overwrite(Some(Value::Integer(2)));
        columns[schema.position("name").unwrap()]
            .update(Some(Value::from("fresh")), true)
            .unwrap();
        let statement = update_row(&schema, &mut columns).unwrap();
        assert!(statement.contains("name = \"fresh\""));
        assert!(statement.contains("modified = \""));
        assert!(statement.ends_with("where stamped.id = 2"));
    }

    #[test]
    fn test_untouched_row_never_issues_timestamp_only_update() {
        let schema = schema_of::<Stamped>().unwrap();
        let mut columns = live_columns(&schema);
        columns[schema.position(ID_COLUMN).unwrap()].overwrite(Some(Value::Integer(2)));
        assert!(update_row(&schema, &mut columns).is_none());
        // the autofill-on-update slot was not stamped by the dirtiness probe
        assert!(columns[schema.position("modified").unwrap()].value().is_none());
    }

    #[test]
    fn test_delete_with_and_without_filter() {
        let schema = schema_of::<Note>().unwrap();
        assert_eq!(delete_rows(&schema, None).unwrap(), "delete from notes");
        let filter = Filter::new().eq("id", 4);
        assert_eq!(
            delete_rows(&schema, Some(&filter)).unwrap(),
            "delete from notes where id = 4"
        );
    }
}
