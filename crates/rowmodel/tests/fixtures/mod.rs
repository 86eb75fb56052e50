//! Shared test fixtures: a scripted in-memory executor and sample models.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use rowmodel::prelude::*;

/// Error type the scripted engine reports.
#[derive(Debug)]
pub struct ScriptedError(pub String);

impl fmt::Display for ScriptedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ScriptedError {}

/// Log shared between a test and the executor it handed to the driver.
pub type StatementLog = Arc<Mutex<Vec<String>>>;

/// A scripted stand-in for the embedded engine: records every statement,
/// replays queued result rows, and can be told to fail on a marker.
pub struct ScriptedExecutor {
    log: StatementLog,
    results: VecDeque<Vec<StorageRow>>,
    next_rowid: i64,
    fail_marker: Option<String>,
    commits: usize,
}

impl ScriptedExecutor {
    pub fn new() -> (Self, StatementLog) {
        let log: StatementLog = Arc::default();
        (
            Self {
                log: Arc::clone(&log),
                results: VecDeque::new(),
                next_rowid: 1,
                fail_marker: None,
                commits: 0,
            },
            log,
        )
    }

    /// Queue rows for the next statement that runs.
    pub fn push_result(&mut self, rows: Vec<StorageRow>) {
        self.results.push_back(rows);
    }

    /// Report this rowid from `last_insert_id`.
    pub fn set_next_rowid(&mut self, rowid: i64) {
        self.next_rowid = rowid;
    }

    /// Fail any statement containing this marker.
    pub fn fail_on(&mut self, marker: &str) {
        self.fail_marker = Some(marker.to_string());
    }

    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl RawExecutor for ScriptedExecutor {
    type Error = ScriptedError;

    fn run(&mut self, statement: &str) -> std::result::Result<Vec<StorageRow>, ScriptedError> {
        if let Some(marker) = &self.fail_marker {
            if statement.contains(marker.as_str()) {
                return Err(ScriptedError(format!("scripted failure near: {marker}")));
            }
        }
        self.log.lock().unwrap().push(statement.to_string());
        Ok(self.results.pop_front().unwrap_or_default())
    }

    fn commit(&mut self) -> std::result::Result<(), ScriptedError> {
        self.commits += 1;
        Ok(())
    }

    fn last_insert_id(&mut self) -> i64 {
        self.next_rowid
    }
}

/// Build a quiet driver (no foreign-key pragma) so statement logs start
/// empty.
pub fn quiet_driver(executor: ScriptedExecutor) -> SerializedDriver<ScriptedExecutor> {
    SerializedDriver::with_options(executor, DriverOptions::new().enforce_foreign_keys(false))
        .expect("driver construction cannot fail without the pragma")
}

/// Drain the shared statement log.
pub fn drain(log: &StatementLog) -> Vec<String> {
    std::mem::take(&mut *log.lock().unwrap())
}

/// `people`: base columns with `name` tightened to not-null.
pub struct Person;

impl Model for Person {
    fn descriptor() -> Result<Descriptor> {
        Ok(Descriptor::new("people").parent(base_descriptor).column(
            "name",
            ColumnValue::text(ColumnConstraints::new().not_null(true))?,
        ))
    }
}

/// `articles`: a foreign key into `people`, soft-disable flag, and both
/// autofill timestamps.
pub struct Article;

impl Model for Article {
    fn descriptor() -> Result<Descriptor> {
        let people = schema_of::<Person>()?;
        Ok(Descriptor::new("articles")
            .parent(base_descriptor)
            .column(
                "author_id",
                ColumnValue::integer(ColumnConstraints::new().references(people, None))?,
            )
            .column("body", ColumnValue::text(ColumnConstraints::new())?)
            .column(
                "disabled",
                ColumnValue::boolean(ColumnConstraints::new().default(Value::Boolean(false)))?,
            )
            .column(
                "created",
                ColumnValue::timestamp(ColumnConstraints::new().autofill_on_create(true))?,
            )
            .column(
                "modified",
                ColumnValue::timestamp(ColumnConstraints::new().autofill_on_update(true))?,
            ))
    }
}
