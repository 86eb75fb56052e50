//! Typed, constrained column slots with change tracking.
//!
//! A [`ColumnValue`] lives twice: once as an immutable template on a
//! [`Schema`](crate::schema::Schema), and once per row instance, where it
//! holds the live value and the dirty flag. External writes go through
//! [`ColumnValue::update`]; the storage-load path uses
//! [`ColumnValue::overwrite`], which bypasses autofill protection.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::timestamp;
use crate::value::Value;

/// The primitive kind a column stores, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// 64-bit integer.
    Integer,
    /// 64-bit float.
    Real,
    /// UTF-8 text.
    Text,
    /// Timestamp stored as fixed-format text.
    TimestampText,
    /// Boolean stored as integer 0/1.
    Boolean,
}

impl ColumnKind {
    /// The SQL type token emitted in DDL.
    #[must_use]
    pub const fn sql_token(&self) -> &'static str {
        match self {
            ColumnKind::Integer | ColumnKind::Boolean => "integer",
            ColumnKind::Real => "real",
            ColumnKind::Text | ColumnKind::TimestampText => "text",
        }
    }

    /// Whether a value's variant matches this kind exactly.
    fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ColumnKind::Integer, Value::Integer(_))
                | (ColumnKind::Real, Value::Real(_))
                | (ColumnKind::Text, Value::Text(_))
                | (ColumnKind::TimestampText, Value::Timestamp(_))
                | (ColumnKind::Boolean, Value::Boolean(_))
        )
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Real => "real",
            ColumnKind::Text => "text",
            ColumnKind::TimestampText => "timestamp text",
            ColumnKind::Boolean => "boolean",
        };
        write!(f, "{name}")
    }
}

/// A reference to a column in another model's schema.
#[derive(Debug, Clone)]
pub struct ForeignKey {
    schema: Arc<Schema>,
    column: Option<String>,
}

impl ForeignKey {
    /// Reference `column` in `schema`; `None` means the conventional `id`.
    pub fn new(schema: Arc<Schema>, column: Option<&str>) -> Self {
        Self {
            schema,
            column: column.map(ToString::to_string),
        }
    }

    /// Table the reference points at.
    #[must_use]
    pub fn referenced_table(&self) -> &str {
        self.schema.table_name()
    }

    /// Column the reference points at (`id` when unspecified).
    #[must_use]
    pub fn referenced_column(&self) -> &str {
        self.column.as_deref().unwrap_or(crate::schema::ID_COLUMN)
    }

    /// Check that the referenced column exists in the referenced schema.
    fn validate(&self) -> Result<()> {
        if self.schema.contains(self.referenced_column()) {
            Ok(())
        } else {
            Err(Error::ForeignKey {
                reference: format!("{}({})", self.referenced_table(), self.referenced_column()),
            })
        }
    }
}

/// Enumerated constraint configuration for one column.
#[derive(Debug, Clone, Default)]
pub struct ColumnConstraints {
    /// Primary key; filled by the store's rowid assignment, never externally.
    pub primary_key: bool,
    /// Reference into another model's schema.
    pub foreign_key: Option<ForeignKey>,
    /// Value must be present at persist time.
    pub not_null: bool,
    /// Seed value used when construction supplies none.
    pub default: Option<Value>,
    /// Timestamp columns: stamp once when first written while unset.
    pub autofill_on_create: bool,
    /// Timestamp columns: stamp on every write to storage.
    pub autofill_on_update: bool,
}

impl ColumnConstraints {
    /// No constraints.
    #[must_use]
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Set the primary-key flag.
    #[must_use]
    pub fn primary_key(mut self, value: bool) -> Self {
        self.primary_key = value;
        self
    }

    /// Set the not-null flag.
    #[must_use]
    pub fn not_null(mut self, value: bool) -> Self {
        self.not_null = value;
        self
    }

    /// Set the default value.
    #[must_use]
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Reference a column in another schema (`None` column means `id`).
    #[must_use]
    pub fn references(mut self, schema: Arc<Schema>, column: Option<&str>) -> Self {
        self.foreign_key = Some(ForeignKey::new(schema, column));
        self
    }

    /// Set the stamp-once-on-create flag.
    #[must_use]
    pub fn autofill_on_create(mut self, value: bool) -> Self {
        self.autofill_on_create = value;
        self
    }

    /// Set the stamp-on-every-write flag.
    #[must_use]
    pub fn autofill_on_update(mut self, value: bool) -> Self {
        self.autofill_on_update = value;
        self
    }
}

/// Coerce a raw value into the representation a column kind stores.
///
/// The embedded store hands booleans back as integers and may hand reals
/// back as integers; pattern text becomes a parsed timestamp.
fn coerce(kind: ColumnKind, value: Value) -> Value {
    match (kind, value) {
        (ColumnKind::TimestampText, Value::Text(s)) => match timestamp::parse(&s) {
            Some(ts) => Value::Timestamp(ts),
            None => Value::Text(s),
        },
        (ColumnKind::Boolean, Value::Integer(i)) => Value::Boolean(i != 0),
        (ColumnKind::Real, Value::Integer(i)) => Value::Real(i as f64),
        (_, value) => value,
    }
}

fn describe(value: Option<&Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "null".to_string(),
    }
}

/// One typed, constrained attribute slot.
#[derive(Debug, Clone)]
pub struct ColumnValue {
    kind: ColumnKind,
    value: Option<Value>,
    constraints: ColumnConstraints,
    dirty: bool,
}

impl ColumnValue {
    /// Build a value slot.
    ///
    /// Fails with [`Error::ForeignKey`] when a foreign-key reference is
    /// dangling, and with [`Error::TypeMismatch`] when the seed value (the
    /// initial value, or the default when no initial value is supplied)
    /// does not match `kind`.
    pub fn new(
        kind: ColumnKind,
        initial: Option<Value>,
        constraints: ColumnConstraints,
    ) -> Result<Self> {
        if let Some(fk) = &constraints.foreign_key {
            fk.validate()?;
        }
        let mut slot = Self {
            kind,
            value: None,
            constraints,
            dirty: false,
        };
        let seed = initial.or_else(|| slot.constraints.default.clone());
        if let Some(v) = seed {
            slot.type_check(Some(&v))?;
            slot.value = Some(coerce(kind, v));
        }
        Ok(slot)
    }

    /// Integer slot with no initial value.
    pub fn integer(constraints: ColumnConstraints) -> Result<Self> {
        Self::new(ColumnKind::Integer, None, constraints)
    }

    /// Real slot with no initial value.
    pub fn real(constraints: ColumnConstraints) -> Result<Self> {
        Self::new(ColumnKind::Real, None, constraints)
    }

    /// Text slot with no initial value.
    pub fn text(constraints: ColumnConstraints) -> Result<Self> {
        Self::new(ColumnKind::Text, None, constraints)
    }

    /// Timestamp slot with no initial value.
    pub fn timestamp(constraints: ColumnConstraints) -> Result<Self> {
        Self::new(ColumnKind::TimestampText, None, constraints)
    }

    /// Boolean slot with no initial value.
    pub fn boolean(constraints: ColumnConstraints) -> Result<Self> {
        Self::new(ColumnKind::Boolean, None, constraints)
    }

    /// The kind this slot stores.
    #[must_use]
    pub const fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Current value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Whether this slot changed since the last successful persist.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reset the dirty flag after a successful persist.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Primary-key flag.
    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        self.constraints.primary_key
    }

    /// Not-null flag.
    #[must_use]
    pub const fn not_null(&self) -> bool {
        self.constraints.not_null
    }

    /// Foreign-key reference, if declared.
    #[must_use]
    pub const fn foreign_key(&self) -> Option<&ForeignKey> {
        self.constraints.foreign_key.as_ref()
    }

    /// Check a candidate against this slot's kind.
    ///
    /// `None` passes universally. Timestamp slots additionally accept text
    /// matching the fixed wire pattern.
    pub fn type_check(&self, candidate: Option<&Value>) -> Result<()> {
        let Some(v) = candidate else {
            return Ok(());
        };
        if self.kind.accepts(v) {
            return Ok(());
        }
        if self.kind == ColumnKind::TimestampText {
            if let Value::Text(s) = v {
                if timestamp::matches_pattern(s) {
                    return Ok(());
                }
            }
        }
        Err(Error::TypeMismatch {
            expected: self.kind,
            actual: describe(Some(v)),
        })
    }

    /// Whether this slot is populated internally and rejects external writes.
    #[must_use]
    pub fn is_autofilled(&self) -> bool {
        self.constraints.primary_key
            || self.constraints.autofill_on_update
            || (self.constraints.autofill_on_create && self.value.is_none())
    }

    /// Replace the value with `candidate`, marking the slot dirty.
    ///
    /// Fails with [`Error::AutofillViolation`] on autofilled slots. Returns
    /// whether a change occurred; an equal candidate leaves the dirty flag
    /// untouched.
    pub fn update(&mut self, candidate: Option<Value>, enforce_type: bool) -> Result<bool> {
        if self.is_autofilled() {
            return Err(Error::AutofillViolation {
                value: describe(candidate.as_ref()),
            });
        }
        if enforce_type {
            self.type_check(candidate.as_ref())?;
        }
        let candidate = candidate.map(|v| coerce(self.kind, v));
        if candidate == self.value {
            return Ok(false);
        }
        self.value = candidate;
        self.dirty = true;
        Ok(true)
    }

    /// Unconditional set, used exclusively by the storage-load path.
    ///
    /// Bypasses autofill protection and dirty tracking.
    pub fn overwrite(&mut self, value: Option<Value>) {
        self.value = value.map(|v| coerce(self.kind, v));
    }

    /// Populate timestamp slots that fill themselves on write.
    ///
    /// Stamps the current time when the slot autofills on update, or when it
    /// autofills on create and is unset; marks dirty on change. A no-op for
    /// every other kind; primary-key fill is the store's rowid assignment.
    pub fn autofill(&mut self) {
        if self.kind != ColumnKind::TimestampText {
            return;
        }
        if self.constraints.autofill_on_update
            || (self.constraints.autofill_on_create && self.value.is_none())
        {
            self.value = Some(Value::Timestamp(timestamp::now()));
            self.dirty = true;
        }
    }

    /// Check write-time constraints.
    ///
    /// Fails with [`Error::RequiredValue`] when the slot is not-null and
    /// unset. Primary-key and foreign-key constraints are validated at
    /// construction and merge time, not here.
    pub fn check_constraint(&self, name: &str) -> Result<()> {
        if self.constraints.not_null && self.value.is_none() {
            return Err(Error::RequiredValue {
                column: name.to_string(),
            });
        }
        Ok(())
    }

    /// Render the effective value as a storage literal, autofilling first.
    pub fn render_for_storage(&mut self) -> String {
        self.autofill();
        match &self.value {
            None => "null".to_string(),
            Some(v) => v.render_literal(),
        }
    }

    /// Render a supplied value as a storage literal, bypassing autofill.
    ///
    /// Used by the filter-predicate path, where the schema template renders
    /// caller-provided values.
    #[must_use]
    pub fn render_override(&self, value: &Value) -> String {
        value.render_literal()
    }

    /// Render the value in its client-facing shape.
    ///
    /// Timestamps truncate to minutes for display; other kinds pass through;
    /// an unset slot renders as JSON null.
    #[must_use]
    pub fn render_for_client(&self) -> serde_json::Value {
        match &self.value {
            None => serde_json::Value::Null,
            Some(Value::Integer(i)) => serde_json::Value::from(*i),
            Some(Value::Real(r)) => serde_json::Value::from(*r),
            Some(Value::Text(s)) => serde_json::Value::from(s.clone()),
            Some(Value::Timestamp(ts)) => serde_json::Value::from(timestamp::format_client(ts)),
            Some(Value::Boolean(b)) => serde_json::Value::from(*b),
        }
    }

    /// Clone this template into a live slot for one row.
    ///
    /// Constraint metadata is copied and the dirty flag reset. A value
    /// coming from storage lands via the overwrite path; fresh input goes
    /// through the type-checked update path, with autofilled slots left for
    /// [`ColumnValue::autofill`] to populate.
    pub fn instantiate(&self, value: Option<Value>, from_storage: bool) -> Result<ColumnValue> {
        let mut slot = self.clone();
        slot.dirty = false;
        match value {
            None => {}
            Some(v) if from_storage => slot.overwrite(Some(v)),
            Some(v) => {
                if slot.is_autofilled() {
                    tracing::trace!(value = %v, "dropping external value for autofilled column");
                } else {
                    slot.update(Some(v), true)?;
                }
            }
        }
        Ok(slot)
    }
}
