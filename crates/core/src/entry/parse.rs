//! Validation of untyped JSON received from the entry service.
//!
//! Field checks are done by hand instead of through `Deserialize` so that
//! each failure maps to a specific [`EntryError`] variant.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use super::error::EntryError;
use super::types::Entry;

/// Parses a single entry from an untyped JSON value.
pub fn parse_entry(raw: &Value) -> Result<Entry, EntryError> {
    let object = raw
        .as_object()
        .ok_or_else(|| EntryError::NotAnObject(json_kind(raw).to_string()))?;

    let id = object
        .get("id")
        .and_then(Value::as_i64)
        .ok_or(EntryError::InvalidId)?;

    let name = object
        .get("name")
        .and_then(Value::as_str)
        .ok_or(EntryError::InvalidName)?;

    let created_at = match object.get("created_at") {
        Some(Value::String(s)) => parse_timestamp(s)?,
        Some(other) => return Err(EntryError::InvalidTimestamp(other.to_string())),
        None => return Err(EntryError::InvalidTimestamp("missing".to_string())),
    };

    Ok(Entry::new(id, name, created_at))
}

/// Parses a JSON array of entries.
///
/// Fails on the first invalid element; a partially parsed list is never
/// returned.
pub fn parse_entry_list(raw: &Value) -> Result<Vec<Entry>, EntryError> {
    let items = raw
        .as_array()
        .ok_or_else(|| EntryError::NotAList(json_kind(raw).to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_entry(item).map_err(|e| EntryError::at_index(index, e)))
        .collect()
}

/// Parses an ISO-8601 timestamp.
///
/// Accepts RFC 3339 with an offset, or a naive date-time which is taken as UTC.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, EntryError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| EntryError::InvalidTimestamp(s.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
