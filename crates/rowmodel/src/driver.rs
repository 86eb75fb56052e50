//! The storage-connection contract and the serializing driver.
//!
//! The engine binding itself is out of scope: callers supply anything
//! implementing [`RawExecutor`], and [`SerializedDriver`] wraps it in the
//! process-wide discipline the rest of the crate assumes: one mutex held
//! for the full duration of each statement, released on success and failure
//! alike, no retries, no statement batching.

use std::sync::Mutex;

use rowmodel_core::error::{Error, Result};
use rowmodel_core::value::Value;

/// One storage row: a cell per schema column, in schema order.
pub type StorageRow = Vec<Option<Value>>;

/// How a statement's result is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// DDL/DML with no result rows and no commit step.
    Statement,
    /// Select returning every matching row.
    FetchAll,
    /// Select returning zero or one row.
    FetchOne,
    /// Write that is durably committed after execution.
    Commit,
}

/// The connection surface the orchestrator executes against.
pub trait StorageConnection {
    /// Execute a single statement. Fetch modes return `Some(rows)`, with a
    /// `FetchOne` miss reported as `None`; other modes return `None`.
    fn execute(&self, statement: &str, mode: ExecMode) -> Result<Option<Vec<StorageRow>>>;

    /// The row id assigned by the most recent insert.
    ///
    /// Valid only immediately after a successful insert on this connection.
    fn last_insert_id(&self) -> Result<i64>;
}

/// The raw engine handle guarded by [`SerializedDriver`].
///
/// Implementations bind an actual embedded engine; the crate only assumes
/// single-statement execution, an explicit commit step, and rowid reporting.
pub trait RawExecutor {
    /// Engine-specific error type, carried through uninterpreted.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run one statement, returning any result rows.
    fn run(&mut self, statement: &str) -> std::result::Result<Vec<StorageRow>, Self::Error>;

    /// Durably commit the preceding statement.
    fn commit(&mut self) -> std::result::Result<(), Self::Error>;

    /// The rowid assigned by the most recent insert.
    fn last_insert_id(&mut self) -> i64;
}

/// Driver construction options.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Issue `PRAGMA foreign_keys = ON` at construction so the engine
    /// enforces the references the compiler emits.
    pub enforce_foreign_keys: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            enforce_foreign_keys: true,
        }
    }
}

impl DriverOptions {
    /// Defaults: foreign-key enforcement on.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle foreign-key enforcement.
    #[must_use]
    pub fn enforce_foreign_keys(mut self, value: bool) -> Self {
        self.enforce_foreign_keys = value;
        self
    }
}

/// A [`StorageConnection`] that serializes all access to one raw executor.
///
/// Fetches and writes share the same lock; concurrent callers block rather
/// than interleave. A failed execution releases the lock and propagates the
/// engine error unchanged.
#[derive(Debug)]
pub struct SerializedDriver<E> {
    executor: Mutex<E>,
}

impl<E: RawExecutor> SerializedDriver<E> {
    /// Wrap an executor with default options.
    pub fn new(executor: E) -> Result<Self> {
        Self::with_options(executor, DriverOptions::default())
    }

    /// Wrap an executor, applying construction-time options.
    pub fn with_options(mut executor: E, options: DriverOptions) -> Result<Self> {
        if options.enforce_foreign_keys {
            executor
                .run("PRAGMA foreign_keys = ON")
                .map_err(into_storage)?;
        }
        Ok(Self {
            executor: Mutex::new(executor),
        })
    }

    /// Take the raw executor back out of the driver.
    pub fn into_inner(self) -> E {
        self.executor.into_inner().unwrap()
    }
}

fn into_storage<E: std::error::Error + Send + Sync + 'static>(err: E) -> Error {
    Error::Storage(Box::new(err))
}

impl<E: RawExecutor> StorageConnection for SerializedDriver<E> {
    fn execute(&self, statement: &str, mode: ExecMode) -> Result<Option<Vec<StorageRow>>> {
        // The guard spans the full execution; early returns on engine errors
        // drop it just like the success path does.
        let mut executor = self.executor.lock().unwrap();
        tracing::debug!(sql = %statement, mode = ?mode, "executing statement");
        match mode {
            ExecMode::Statement => {
                executor.run(statement).map_err(into_storage)?;
                Ok(None)
            }
            ExecMode::FetchAll => Ok(Some(executor.run(statement).map_err(into_storage)?)),
            ExecMode::FetchOne => {
                let mut rows = executor.run(statement).map_err(into_storage)?;
                if rows.is_empty() {
                    Ok(None)
                } else {
                    rows.truncate(1);
                    Ok(Some(rows))
                }
            }
            ExecMode::Commit => {
                executor.run(statement).map_err(into_storage)?;
                executor.commit().map_err(into_storage)?;
                Ok(None)
            }
        }
    }

    fn last_insert_id(&self) -> Result<i64> {
        Ok(self.executor.lock().unwrap().last_insert_id())
    }
}
