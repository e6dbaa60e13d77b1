//! JSON flattening for tabular report sheets
//!
//! Nested objects flatten to dotted keys (`attributes.hostname`), array
//! elements to indexed keys (`tags.0`). Scalars pass through untouched.

use crate::types::{JsonObject, Record};
use serde_json::Value;

/// Flatten one record into a single-level map of dotted keys to scalars.
pub fn flatten_record(record: &Record) -> JsonObject {
    let mut flat = JsonObject::new();
    flatten_into(&mut flat, "", record);
    flat
}

/// Flatten every record, preserving order.
pub fn flatten_records(records: &[Record]) -> Vec<JsonObject> {
    records.iter().map(flatten_record).collect()
}

fn flatten_into(flat: &mut JsonObject, prefix: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(flat, &path, child);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let path = if prefix.is_empty() {
                    index.to_string()
                } else {
                    format!("{prefix}.{index}")
                };
                flatten_into(flat, &path, child);
            }
        }
        scalar => {
            // A scalar at the top level (no prefix) has no column name to
            // live under; store it as "value" so it still lands somewhere.
            let key = if prefix.is_empty() { "value" } else { prefix };
            flat.insert(key.to_string(), scalar.clone());
        }
    }
}

/// The ordered union of field names across flattened rows, first-seen
/// order. This becomes the sheet header.
pub fn field_names(rows: &[JsonObject]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut names = Vec::new();
    for row in rows {
        for key in row.keys() {
            if seen.insert(key.clone()) {
                names.push(key.clone());
            }
        }
    }
    names
}

/// Render a flattened cell for a sheet. Strings come out bare; other
/// scalars in their JSON form; missing cells are the empty string.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
