//! Equality filters and predicate rendering.
//!
//! A [`Filter`] is an ordered list of `(column, Option<Value>)` pairs.
//! Rendering drops pairs whose value is `None` entirely; they are NOT
//! rendered as null-equality. Only the equality operation is supported.

use rowmodel_core::error::{Error, Result};
use rowmodel_core::schema::Schema;
use rowmodel_core::value::Value;

/// An ordered set of column/value equality conditions.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pairs: Vec<(String, Option<Value>)>,
}

impl Filter {
    /// An empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column = value`.
    #[must_use]
    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.opt(column, Some(value.into()))
    }

    /// Add a condition whose value may be absent. A `None` value is kept in
    /// the pair list but dropped at render time.
    #[must_use]
    pub fn opt(mut self, column: impl Into<String>, value: Option<Value>) -> Self {
        self.pairs.push((column.into(), value));
        self
    }

    /// The raw pairs, in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, Option<Value>)] {
        &self.pairs
    }

    /// True when no pairs were added at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Render a filter into a `where`-clause predicate.
///
/// `None`-valued pairs are skipped before their column is even resolved;
/// a remaining pair naming a column outside the schema fails with
/// [`Error::UnknownAttribute`]. Literals render through the schema
/// template's override renderer. Returns an empty string when every pair
/// was dropped.
pub fn render_predicate(schema: &Schema, filter: &Filter) -> Result<String> {
    let mut parts: Vec<String> = Vec::new();
    for (name, value) in &filter.pairs {
        let Some(value) = value else {
            continue;
        };
        let Some(template) = schema.template(name) else {
            return Err(Error::UnknownAttribute { name: name.clone() });
        };
        parts.push(format!("{} = {}", name, template.render_override(value)));
    }
    Ok(parts.join(" and "))
}
