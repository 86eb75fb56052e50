//! Row instances: one schema bound to live column values.
//!
//! A [`RowInstance`] moves one way through two states: transient (no id) and
//! persisted (id assigned by the store). [`RowInstance::persist`] chooses
//! insert or update accordingly, and [`ModelOps`] carries the table-level
//! operations every model shares: create/drop table, fetches, and bulk
//! deletes.

use std::collections::HashMap;
use std::sync::Arc;

use rowmodel_core::column::ColumnValue;
use rowmodel_core::error::{Error, Result};
use rowmodel_core::schema::{ID_COLUMN, Model, Schema, schema_of};
use rowmodel_core::value::Value;
use rowmodel_query::dml::{delete_rows, insert_row, select_all, select_one, update_row};
use rowmodel_query::filter::Filter;
use rowmodel_schema::ddl::{create_table, drop_table};

use crate::driver::{ExecMode, StorageConnection, StorageRow};

/// Boolean column that, when declared, hides soft-disabled rows from
/// [`ModelOps::fetch_by_id`].
const DISABLED_COLUMN: &str = "disabled";

/// Input values for constructing or mutating a row.
#[derive(Debug, Clone)]
pub enum Values {
    /// Keyed by column name; absent keys keep their template value.
    Named(Vec<(String, Option<Value>)>),
    /// One value per schema column, in schema order.
    Positional(Vec<Option<Value>>),
}

impl Values {
    /// Build keyed input.
    pub fn named<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<Value>)>,
        S: Into<String>,
    {
        Values::Named(
            pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    /// Build positional input.
    pub fn positional<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<Value>>,
    {
        Values::Positional(values.into_iter().collect())
    }
}

/// Validate input against a schema before any statement is compiled.
///
/// Keyed input fails with [`Error::UnknownAttribute`] for keys outside the
/// schema; positional input fails with [`Error::ArityMismatch`] when its
/// length differs from the schema size. Every provided value is type-checked
/// against its column template.
pub fn validate(schema: &Schema, values: &Values) -> Result<()> {
    match values {
        Values::Named(pairs) => {
            for (name, value) in pairs {
                let Some(template) = schema.template(name) else {
                    return Err(Error::UnknownAttribute { name: name.clone() });
                };
                template.type_check(value.as_ref())?;
            }
        }
        Values::Positional(list) => {
            if list.len() != schema.len() {
                return Err(Error::ArityMismatch {
                    expected: schema.len(),
                    actual: list.len(),
                });
            }
            for ((_, template), value) in schema.columns().zip(list) {
                template.type_check(value.as_ref())?;
            }
        }
    }
    Ok(())
}

/// One possibly-persisted row: a shared schema template plus live column
/// slots aligned to the schema's stable ordering.
#[derive(Debug)]
pub struct RowInstance {
    schema: Arc<Schema>,
    columns: Vec<ColumnValue>,
}

/// The schema a row was built from; the counterpart of
/// [`schema_of`] for live instances.
#[must_use]
pub fn schema_of_instance(row: &RowInstance) -> Arc<Schema> {
    Arc::clone(&row.schema)
}

impl RowInstance {
    /// Validate input and build a row for model `M`.
    ///
    /// A present `id` value marks the input as storage-originated: values
    /// land through the overwrite path, bypassing autofill protection.
    /// Fresh input goes through the type-checked update path.
    pub fn create<M: Model>(values: Values) -> Result<Self> {
        let schema = schema_of::<M>()?;
        Self::with_schema(schema, values)
    }

    /// Build a row with every column at its template value.
    pub fn empty<M: Model>() -> Result<Self> {
        let schema = schema_of::<M>()?;
        let columns = schema
            .columns()
            .map(|(_, template)| template.instantiate(None, false))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { schema, columns })
    }

    /// As [`RowInstance::create`], for an already-resolved schema.
    pub fn with_schema(schema: Arc<Schema>, values: Values) -> Result<Self> {
        validate(&schema, &values)?;
        let id_position = schema.position(ID_COLUMN);
        let from_storage = match &values {
            Values::Named(pairs) => pairs
                .iter()
                .any(|(name, value)| name == ID_COLUMN && value.is_some()),
            Values::Positional(list) => id_position
                .and_then(|position| list.get(position))
                .is_some_and(Option::is_some),
        };

        let mut columns = Vec::with_capacity(schema.len());
        match values {
            Values::Named(pairs) => {
                let mut lookup: HashMap<String, Option<Value>> = pairs.into_iter().collect();
                for (name, template) in schema.columns() {
                    let value = lookup.remove(name).flatten();
                    columns.push(template.instantiate(value, from_storage)?);
                }
            }
            Values::Positional(list) => {
                for ((_, template), value) in schema.columns().zip(list) {
                    columns.push(template.instantiate(value, from_storage)?);
                }
            }
        }
        Ok(Self { schema, columns })
    }

    /// Rebuild a row from a storage result row (the fetch path).
    pub fn from_storage_row(schema: Arc<Schema>, row: StorageRow) -> Result<Self> {
        if row.len() != schema.len() {
            return Err(Error::ArityMismatch {
                expected: schema.len(),
                actual: row.len(),
            });
        }
        let columns = schema
            .columns()
            .zip(row)
            .map(|((_, template), value)| template.instantiate(value, true))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { schema, columns })
    }

    /// The schema this row was built from.
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The row's id, once assigned.
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        let position = self.schema.position(ID_COLUMN)?;
        self.columns[position].value().and_then(Value::as_integer)
    }

    /// Whether this row has been assigned an id by the store.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.id().is_some()
    }

    /// Current value of a named column.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.schema
            .position(name)
            .and_then(|position| self.columns[position].value())
    }

    /// The live column slot at a schema position.
    #[must_use]
    pub fn column_at(&self, position: usize) -> Option<&ColumnValue> {
        self.columns.get(position)
    }

    /// Write this row to storage.
    ///
    /// Inserts when no id is set, otherwise updates only what is dirty; an
    /// update with nothing dirty is a successful no-op. Constraints are
    /// checked after the statement is compiled (compiling runs autofill) and
    /// before anything executes. On insert the row adopts the store's
    /// assigned rowid; all dirty flags clear on success.
    pub fn persist<C: StorageConnection>(&mut self, connection: &C) -> Result<bool> {
        let schema = Arc::clone(&self.schema);
        let inserting = self.id().is_none();
        let statement = if inserting {
            Some(insert_row(&schema, &mut self.columns))
        } else {
            update_row(&schema, &mut self.columns)
        };
        let Some(statement) = statement else {
            tracing::trace!(table = %schema.table_name(), "nothing dirty, persist is a no-op");
            return Ok(true);
        };

        self.check_constraints()?;
        connection.execute(&statement, ExecMode::Commit)?;

        if inserting {
            let rowid = connection.last_insert_id()?;
            if let Some(position) = schema.position(ID_COLUMN) {
                self.columns[position].overwrite(Some(Value::Integer(rowid)));
            }
        }
        self.clear_dirty();
        Ok(true)
    }

    /// Validate and apply keyed or positional changes.
    ///
    /// Returns the names of columns whose value actually changed. Autofilled
    /// columns are excluded from external mutation here; their stamps come
    /// from the compile-time autofill, not from input.
    pub fn apply_changes(&mut self, values: &Values) -> Result<Vec<String>> {
        validate(&self.schema, values)?;
        let schema = Arc::clone(&self.schema);
        let mut changed = Vec::new();
        match values {
            Values::Named(pairs) => {
                for (name, value) in pairs {
                    let Some(position) = schema.position(name) else {
                        continue;
                    };
                    if self.apply_one(position, value.clone())? {
                        changed.push(name.clone());
                    }
                }
            }
            Values::Positional(list) => {
                for (position, value) in list.iter().enumerate() {
                    if self.apply_one(position, value.clone())? {
                        changed.push(schema.name_at(position).unwrap_or_default().to_string());
                    }
                }
            }
        }
        Ok(changed)
    }

    fn apply_one(&mut self, position: usize, value: Option<Value>) -> Result<bool> {
        let column = &mut self.columns[position];
        if column.is_autofilled() {
            tracing::trace!(position, "skipping external write to autofilled column");
            return Ok(false);
        }
        column.update(value, true)
    }

    /// Render the row in its client-facing shape: a JSON object keyed by
    /// column name, timestamps truncated for display.
    #[must_use]
    pub fn to_client(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        for ((name, _), column) in self.schema.columns().zip(&self.columns) {
            object.insert(name.to_string(), column.render_for_client());
        }
        serde_json::Value::Object(object)
    }

    fn check_constraints(&self) -> Result<()> {
        for ((name, _), column) in self.schema.columns().zip(&self.columns) {
            column.check_constraint(name)?;
        }
        Ok(())
    }

    fn clear_dirty(&mut self) {
        for column in &mut self.columns {
            column.clear_dirty();
        }
    }
}

/// Table-level operations available on every registered model.
pub trait ModelOps: Model + Sized {
    /// Create this model's table in the connected store.
    fn init_table<C: StorageConnection>(connection: &C) -> Result<()> {
        let schema = schema_of::<Self>()?;
        let statement = create_table(&schema);
        connection.execute(&statement, ExecMode::Statement)?;
        Ok(())
    }

    /// Drop this model's table.
    fn drop_table<C: StorageConnection>(connection: &C) -> Result<()> {
        let schema = schema_of::<Self>()?;
        let statement = drop_table(&schema);
        connection.execute(&statement, ExecMode::Statement)?;
        Ok(())
    }

    /// Fetch one row by id.
    ///
    /// When the schema declares a `disabled` column, soft-disabled rows are
    /// filtered out; fetch through [`ModelOps::fetch_one`] with an explicit
    /// filter to see them.
    fn fetch_by_id<C: StorageConnection>(connection: &C, id: i64) -> Result<Option<RowInstance>> {
        let schema = schema_of::<Self>()?;
        let mut filter = Filter::new().eq(ID_COLUMN, id);
        if schema.contains(DISABLED_COLUMN) {
            filter = filter.eq(DISABLED_COLUMN, false);
        }
        Self::fetch_one(connection, &filter)
    }

    /// Fetch every row matching the filter (or all rows without one).
    fn fetch_many<C: StorageConnection>(
        connection: &C,
        filter: Option<&Filter>,
    ) -> Result<Vec<RowInstance>> {
        let schema = schema_of::<Self>()?;
        let statement = select_all(&schema, filter)?;
        let rows = connection
            .execute(&statement, ExecMode::FetchAll)?
            .unwrap_or_default();
        rows.into_iter()
            .map(|row| RowInstance::from_storage_row(Arc::clone(&schema), row))
            .collect()
    }

    /// Fetch the first row matching the filter, if any.
    fn fetch_one<C: StorageConnection>(
        connection: &C,
        filter: &Filter,
    ) -> Result<Option<RowInstance>> {
        let schema = schema_of::<Self>()?;
        let statement = select_one(&schema, filter)?;
        match connection.execute(&statement, ExecMode::FetchOne)? {
            Some(rows) => rows
                .into_iter()
                .next()
                .map(|row| RowInstance::from_storage_row(schema, row))
                .transpose(),
            None => Ok(None),
        }
    }

    /// Delete every row matching the filter (or all rows without one).
    fn delete_many<C: StorageConnection>(connection: &C, filter: Option<&Filter>) -> Result<()> {
        let schema = schema_of::<Self>()?;
        let statement = delete_rows(&schema, filter)?;
        connection.execute(&statement, ExecMode::Statement)?;
        Ok(())
    }
}

impl<M: Model> ModelOps for M {}
