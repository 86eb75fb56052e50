//! Error taxonomy for schema, validation, and storage failures.

use std::error::Error as StdError;
use std::fmt;

use crate::column::ColumnKind;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the model layer.
///
/// Validation errors are raised before any SQL is compiled or executed.
/// Storage errors carry the engine's own error through uninterpreted.
#[derive(Debug)]
pub enum Error {
    /// A not-null column has no value at constraint-check time.
    RequiredValue {
        /// The offending column.
        column: String,
    },
    /// A value does not match the column's kind (or timestamp pattern).
    TypeMismatch {
        /// The kind the column expects.
        expected: ColumnKind,
        /// Rendering of the rejected candidate.
        actual: String,
    },
    /// An input key does not name a schema column.
    UnknownAttribute {
        /// The undeclared name.
        name: String,
    },
    /// Positional input length differs from the schema size.
    ArityMismatch {
        /// Number of schema columns.
        expected: usize,
        /// Number of values provided.
        actual: usize,
    },
    /// A foreign-key declaration references a column that does not exist.
    ForeignKey {
        /// Rendering of the offending reference.
        reference: String,
    },
    /// An external write was attempted on an autofilled column.
    AutofillViolation {
        /// Rendering of the rejected value.
        value: String,
    },
    /// An uninterpreted error from the storage engine.
    Storage(Box<dyn StdError + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::RequiredValue { column } => {
                write!(f, "column \"{column}\" requires a value")
            }
            Error::TypeMismatch { expected, actual } => {
                write!(f, "expected a {expected} value, got {actual}")
            }
            Error::UnknownAttribute { name } => {
                write!(f, "attribute \"{name}\" is not declared in the schema")
            }
            Error::ArityMismatch { expected, actual } => {
                write!(
                    f,
                    "schema has {expected} columns but {actual} values were provided"
                )
            }
            Error::ForeignKey { reference } => {
                write!(
                    f,
                    "foreign key must reference an existing column, got {reference}"
                )
            }
            Error::AutofillViolation { value } => {
                write!(
                    f,
                    "column is autofilled and must not be written externally, got {value}"
                )
            }
            Error::Storage(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Storage(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
