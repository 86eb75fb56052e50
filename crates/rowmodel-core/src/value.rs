//! The shared value type carried by column slots, filters, and storage rows.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::timestamp;

/// A single typed value.
///
/// Absence is represented as `Option<Value>::None` throughout the crate;
/// there is no null variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// A timestamp, stored as text on the wire.
    Timestamp(NaiveDateTime),
    /// Boolean, stored as integer 0/1 on the wire.
    Boolean(bool),
}

impl Value {
    /// Human-readable name of this value's shape, used in error messages.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
            Value::Boolean(_) => "boolean",
        }
    }

    /// Render this value as a storage literal.
    ///
    /// Numerics are bare, booleans encode as `0`/`1`, text and timestamps are
    /// double-quote delimited. Embedded quotes are NOT escaped; the encoding
    /// stays wire-compatible with data written by the original renderer.
    #[must_use]
    pub fn render_literal(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::Real(r) => r.to_string(),
            Value::Text(s) => format!("\"{s}\""),
            Value::Timestamp(ts) => format!("\"{}\"", timestamp::format_storage(ts)),
            Value::Boolean(b) => (if *b { "1" } else { "0" }).to_string(),
        }
    }

    /// Integer payload, if this is an integer.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Text payload, if this is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean payload, if this is a boolean.
    #[must_use]
    pub const fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Timestamp(ts) => write!(f, "{}", timestamp::format_storage(ts)),
            Value::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_literal_numerics_are_bare() {
        assert_eq!(Value::Integer(42).render_literal(), "42");
        assert_eq!(Value::Real(1.5).render_literal(), "1.5");
    }

    #[test]
    fn test_render_literal_text_is_quoted() {
        assert_eq!(Value::from("Alice").render_literal(), "\"Alice\"");
    }

    #[test]
    fn test_render_literal_boolean_encodes_as_integer() {
        assert_eq!(Value::Boolean(true).render_literal(), "1");
        assert_eq!(Value::Boolean(false).render_literal(), "0");
    }

    #[test]
    fn test_render_literal_timestamp_is_quoted_and_truncated() {
        let ts = timestamp::parse("2024-03-01 10:20:30.123").unwrap();
        assert_eq!(
            Value::Timestamp(ts).render_literal(),
            "\"2024-03-01 10:20:30.123\""
        );
    }

    #[test]
    fn test_shape_names() {
        assert_eq!(Value::Integer(1).shape(), "integer");
        assert_eq!(Value::from("x").shape(), "text");
        assert_eq!(Value::Boolean(true).shape(), "boolean");
    }
}
