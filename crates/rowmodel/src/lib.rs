//! Declarative row models over an embedded SQL store.
//!
//! `rowmodel` is the facade crate: it binds the pieces from the member
//! crates into a usable surface.
//!
//! - Declare a model by implementing [`Model`] with an explicit
//!   [`Descriptor`]; the registry merges the parent chain once and caches
//!   the resulting [`Schema`].
//! - Bind a schema to values with [`RowInstance`]; write through
//!   [`RowInstance::persist`] and mutate through
//!   [`RowInstance::apply_changes`].
//! - Table-level operations (create/drop table, fetches, deletes) come from
//!   [`ModelOps`], implemented for every model.
//! - All storage access goes through a [`StorageConnection`], in practice a
//!   [`SerializedDriver`] wrapping the caller's engine handle behind one
//!   process-wide lock.
//!
//! # Example
//!
//! ```
//! use rowmodel::prelude::*;
//!
//! struct Person;
//!
//! impl Model for Person {
//!     fn descriptor() -> Result<Descriptor> {
//!         Ok(Descriptor::new("people")
//!             .parent(base_descriptor)
//!             .column(
//!                 "name",
//!                 ColumnValue::text(ColumnConstraints::new().not_null(true))?,
//!             ))
//!     }
//! }
//!
//! let row = RowInstance::create::<Person>(Values::named([(
//!     "name",
//!     Some(Value::from("Alice")),
//! )]))?;
//! assert!(!row.is_persisted());
//! # rowmodel::Result::Ok(())
//! ```

pub mod driver;
pub mod row;

pub use rowmodel_core::{
    ColumnConstraints, ColumnKind, ColumnValue, Descriptor, Error, ForeignKey, ID_COLUMN, Model,
    Result, Schema, TableIdentity, Value, base_descriptor, schema_of,
};
pub use rowmodel_query::{Filter, delete_rows, insert_row, select_all, select_one, update_row};
pub use rowmodel_schema::{create_table, drop_table};

pub use driver::{DriverOptions, ExecMode, RawExecutor, SerializedDriver, StorageConnection,
    StorageRow};
pub use row::{ModelOps, RowInstance, Values, schema_of_instance, validate};

/// The convenient single import for applications.
pub mod prelude {
    pub use crate::driver::{
        DriverOptions, ExecMode, RawExecutor, SerializedDriver, StorageConnection, StorageRow,
    };
    pub use crate::row::{ModelOps, RowInstance, Values, schema_of_instance, validate};
    pub use rowmodel_core::{
        ColumnConstraints, ColumnKind, ColumnValue, Descriptor, Error, ID_COLUMN, Model, Result,
        Schema, Value, base_descriptor, schema_of,
    };
    pub use rowmodel_query::Filter;
}
