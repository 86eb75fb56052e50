//! Fixed-format timestamp codec.
//!
//! Timestamps travel as text in the exact shape `YYYY-MM-DD HH:MM:SS.mmm`,
//! truncated to millisecond precision. Client-facing display truncates
//! further to minutes.

use std::sync::OnceLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;

/// Storage wire format, three fractional digits.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Client display format, truncated to minutes.
pub const CLIENT_FORMAT: &str = "%Y-%m-%d %H:%M";

const PATTERN: &str = r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{3}$";

/// Compiled wire-format pattern, compiled once on first use.
fn pattern() -> &'static Regex {
    static PATTERN_CELL: OnceLock<Regex> = OnceLock::new();
    PATTERN_CELL.get_or_init(|| Regex::new(PATTERN).expect("timestamp pattern is valid"))
}

/// Check whether `text` matches the wire format.
#[must_use]
pub fn matches_pattern(text: &str) -> bool {
    pattern().is_match(text)
}

/// Parse wire-format text into a timestamp.
///
/// Returns `None` for text that does not match the fixed pattern.
#[must_use]
pub fn parse(text: &str) -> Option<NaiveDateTime> {
    if !matches_pattern(text) {
        return None;
    }
    NaiveDateTime::parse_from_str(text, STORAGE_FORMAT).ok()
}

/// Render a timestamp in the storage wire format.
#[must_use]
pub fn format_storage(ts: &NaiveDateTime) -> String {
    ts.format(STORAGE_FORMAT).to_string()
}

/// Render a timestamp for client display.
#[must_use]
pub fn format_client(ts: &NaiveDateTime) -> String {
    ts.format(CLIENT_FORMAT).to_string()
}

/// The current local time, used for autofill stamps.
#[must_use]
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
