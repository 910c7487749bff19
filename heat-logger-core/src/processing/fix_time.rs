//! Timestamp formatting shared by the record columns.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Canonical timestamp format for both timestamp columns.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// ISO-8601 form emitted by the fix service (`2025-06-22T14:03:07.000Z`).
/// The fractional seconds are optional.
const FIX_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Format a system timestamp for the `System_Timestamp_UTC` column.
pub fn format_system_time(timestamp: DateTime<Utc>) -> String {
    timestamp.format(CANONICAL_FORMAT).to_string()
}

/// Normalize a fix-service time string to `CANONICAL_FORMAT`.
///
/// Unparseable input is passed through unchanged; consumers of the
/// `GPS_Timestamp_UTC` column must accept either form.
pub fn normalize_fix_time(raw: &str) -> String {
    match NaiveDateTime::parse_from_str(raw, FIX_TIME_FORMAT) {
        Ok(parsed) => parsed.format(CANONICAL_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}
