//! DML rendering and filter predicates for rowmodel.
//!
//! Pure, stateless functions mapping a merged schema (plus, for writes, the
//! row's live column slots) to single-line SQL text. The update renderer
//! emits only dirty columns and reports "no statement" when nothing changed;
//! filter predicates drop `None`-valued pairs entirely.

pub mod dml;
pub mod filter;

pub use dml::{delete_rows, insert_row, select_all, select_one, update_row};
pub use filter::{Filter, render_predicate};
