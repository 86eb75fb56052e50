//! Model descriptors, the parent-chain merge, and the schema registry.
//!
//! Models register their columns explicitly through a [`Descriptor`]; the
//! merge walks the parent chain from the most distant ancestor down, with
//! later declarations shadowing same-named earlier ones in place. The
//! resulting [`Schema`] is immutable and cached process-wide by model type,
//! so every row instance of a model shares one `Arc<Schema>` template.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

use crate::column::{ColumnConstraints, ColumnValue};
use crate::error::Result;

/// Name of the conventional integer primary-key column.
pub const ID_COLUMN: &str = "id";

/// A descriptor-producing function, used to point at a parent model.
pub type DescriptorFn = fn() -> Result<Descriptor>;

/// A model's declared shape: name, optional table override, optional parent,
/// and its ordered column templates.
#[derive(Debug)]
pub struct Descriptor {
    name: &'static str,
    table: Option<&'static str>,
    parent: Option<DescriptorFn>,
    columns: Vec<(&'static str, ColumnValue)>,
}

impl Descriptor {
    /// Start a descriptor for a model with the given declared name.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            table: None,
            parent: None,
            columns: Vec::new(),
        }
    }

    /// Override the table name (defaults to the declared model name).
    #[must_use]
    pub fn table(mut self, name: &'static str) -> Self {
        self.table = Some(name);
        self
    }

    /// Inherit columns from a parent model.
    #[must_use]
    pub fn parent(mut self, parent: DescriptorFn) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Declare a column. Declaration order is significant; a name already
    /// declared by an ancestor shadows it in place.
    #[must_use]
    pub fn column(mut self, name: &'static str, template: ColumnValue) -> Self {
        self.columns.push((name, template));
        self
    }

    /// The declared model name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

/// A model type that can be registered and merged into a [`Schema`].
pub trait Model: 'static {
    /// Declare this model's descriptor. Building column templates can fail
    /// (dangling foreign keys), so the declaration itself is fallible.
    fn descriptor() -> Result<Descriptor>;
}

/// The root ancestor every model inherits by convention: an `id` integer
/// primary key and a `name` text column.
pub fn base_descriptor() -> Result<Descriptor> {
    Ok(Descriptor::new("basic")
        .column(
            ID_COLUMN,
            ColumnValue::integer(ColumnConstraints::new().primary_key(true))?,
        )
        .column("name", ColumnValue::text(ColumnConstraints::new())?))
}

/// A schema's resolved table name; fixed once the schema is merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIdentity(String);

impl TableIdentity {
    /// The resolved name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The flattened, ordered attribute map of one model.
#[derive(Debug)]
pub struct Schema {
    model: &'static str,
    table: TableIdentity,
    columns: Vec<(&'static str, ColumnValue)>,
    index: HashMap<&'static str, usize>,
}

impl Schema {
    /// Merge a descriptor and its parent chain into a flat schema.
    ///
    /// A pure aggregation: malformed columns (e.g. dangling foreign keys)
    /// were already rejected when their templates were constructed.
    pub fn merge(descriptor: &Descriptor) -> Result<Schema> {
        let mut columns: Vec<(&'static str, ColumnValue)> = Vec::new();
        let mut index: HashMap<&'static str, usize> = HashMap::new();
        collect(descriptor, &mut columns, &mut index)?;
        let table = TableIdentity(descriptor.table.unwrap_or(descriptor.name).to_string());
        tracing::trace!(
            model = descriptor.name,
            table = %table,
            columns = columns.len(),
            "merged schema"
        );
        Ok(Schema {
            model: descriptor.name,
            table,
            columns,
            index,
        })
    }

    /// The declared model name.
    #[must_use]
    pub const fn model_name(&self) -> &'static str {
        self.model
    }

    /// The resolved table identity.
    #[must_use]
    pub const fn table_identity(&self) -> &TableIdentity {
        &self.table
    }

    /// The resolved table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        self.table.as_str()
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the schema declares no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether a column with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of a column in the stable ordering.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Template for a named column.
    #[must_use]
    pub fn template(&self, name: &str) -> Option<&ColumnValue> {
        self.position(name).map(|pos| &self.columns[pos].1)
    }

    /// Template at a position.
    #[must_use]
    pub fn template_at(&self, position: usize) -> Option<&ColumnValue> {
        self.columns.get(position).map(|(_, template)| template)
    }

    /// Column name at a position.
    #[must_use]
    pub fn name_at(&self, position: usize) -> Option<&'static str> {
        self.columns.get(position).map(|(name, _)| *name)
    }

    /// Iterate `(name, template)` pairs in stable order.
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, &ColumnValue)> {
        self.columns.iter().map(|(name, template)| (*name, template))
    }
}

/// Ancestor-first collection: recurse to the most distant parent, then let
/// each level override same-named entries in place, preserving the position
/// where a name was first seen.
fn collect(
    descriptor: &Descriptor,
    columns: &mut Vec<(&'static str, ColumnValue)>,
    index: &mut HashMap<&'static str, usize>,
) -> Result<()> {
    if let Some(parent) = descriptor.parent {
        let parent = parent()?;
        collect(&parent, columns, index)?;
    }
    for (name, template) in &descriptor.columns {
        match index.get(name) {
            Some(&pos) => columns[pos].1 = template.clone(),
            None => {
                index.insert(name, columns.len());
                columns.push((name, template.clone()));
            }
        }
    }
    Ok(())
}

fn registry() -> &'static RwLock<HashMap<TypeId, Arc<Schema>>> {
    static REGISTRY: OnceLock<RwLock<HashMap<TypeId, Arc<Schema>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// The merged schema for a model type, cached by model identity.
///
/// The merge runs once per model per process; every caller afterwards gets
/// the same shared template. The lock is never held while merging, so
/// descriptors are free to resolve other models' schemas (foreign keys).
pub fn schema_of<M: Model>() -> Result<Arc<Schema>> {
    let key = TypeId::of::<M>();
    {
        let cache = registry().read().unwrap();
        if let Some(schema) = cache.get(&key) {
            return Ok(Arc::clone(schema));
        }
    }

    let descriptor = M::descriptor()?;
    let schema = Arc::new(Schema::merge(&descriptor)?);

    let mut cache = registry().write().unwrap();
    let entry = cache.entry(key).or_insert(schema);
    Ok(Arc::clone(entry))
}
