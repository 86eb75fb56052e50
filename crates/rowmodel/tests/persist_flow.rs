//! End-to-end persist semantics against the scripted engine.

mod fixtures;

use fixtures::{Person, ScriptedExecutor, drain, quiet_driver};
use rowmodel::prelude::*;

#[test]
fn insert_compiles_null_id_and_adopts_the_assigned_rowid() {
    let (mut executor, log) = ScriptedExecutor::new();
    executor.set_next_rowid(7);
    let driver = quiet_driver(executor);

    let mut row = RowInstance::create::<Person>(Values::named([(
        "name",
        Some(Value::from("Alice")),
    )]))
    .unwrap();
    assert!(!row.is_persisted());

    assert!(row.persist(&driver).unwrap());
    assert_eq!(
        drain(&log),
        vec!["insert into people (id, name) values (null, \"Alice\")".to_string()]
    );
    assert_eq!(row.id(), Some(7));
    assert!(row.is_persisted());
}

#[test]
fn update_after_apply_changes_touches_only_dirty_columns() {
    let (mut executor, log) = ScriptedExecutor::new();
    executor.set_next_rowid(7);
    let driver = quiet_driver(executor);

    let mut row = RowInstance::create::<Person>(Values::named([(
        "name",
        Some(Value::from("Alice")),
    )]))
    .unwrap();
    row.persist(&driver).unwrap();
    drain(&log);

    let changed = row
        .apply_changes(&Values::named([("name", Some(Value::from("Bob")))]))
        .unwrap();
    assert_eq!(changed, vec!["name".to_string()]);

    assert!(row.persist(&driver).unwrap());
    assert_eq!(
        drain(&log),
        vec!["update people set name = \"Bob\" where people.id = 7".to_string()]
    );
}

#[test]
fn persisting_an_unmodified_row_is_a_no_op_twice_over() {
    let (mut executor, log) = ScriptedExecutor::new();
    executor.set_next_rowid(3);
    let driver = quiet_driver(executor);

    let mut row = RowInstance::create::<Person>(Values::named([(
        "name",
        Some(Value::from("Alice")),
    )]))
    .unwrap();
    row.persist(&driver).unwrap();
    drain(&log);

    assert!(row.persist(&driver).unwrap());
    assert!(row.persist(&driver).unwrap());
    assert!(drain(&log).is_empty());
}

#[test]
fn missing_required_value_fails_before_any_statement_executes() {
    let (executor, log) = ScriptedExecutor::new();
    let driver = quiet_driver(executor);

    // type_check allows None universally, so construction succeeds
    let mut row =
        RowInstance::create::<Person>(Values::named([("name", None::<Value>)])).unwrap();

    let err = row.persist(&driver).unwrap_err();
    assert!(matches!(err, Error::RequiredValue { column } if column == "name"));
    assert!(drain(&log).is_empty());
    assert!(!row.is_persisted());
}

#[test]
fn storage_errors_propagate_unchanged_to_the_caller() {
    let (mut executor, log) = ScriptedExecutor::new();
    executor.fail_on("insert into people");
    let driver = quiet_driver(executor);

    let mut row = RowInstance::create::<Person>(Values::named([(
        "name",
        Some(Value::from("Alice")),
    )]))
    .unwrap();

    let err = row.persist(&driver).unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert!(err.to_string().contains("scripted failure"));
    // the failed execution did not adopt an id or clear state
    assert!(!row.is_persisted());
    assert!(drain(&log).is_empty());
}
