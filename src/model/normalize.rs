// Normalize-on-read: repair ledger documents written before schema changes
//
// Earlier writers left list fields missing or null, stored submission times
// as epoch milliseconds, and seeded records without a version. Every document
// read from the world state passes through here before the workflow sees it.

use chrono::DateTime;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::record::Record;

const ARRAY_FIELDS: [&str; 2] = ["propertyHeldInfos", "propertyRemarks"];
const RECORD_TIMESTAMPS: [&str; 2] = ["createdAt", "updatedAt"];
const ENTRY_TIMESTAMPS: [&str; 3] = ["submittedAt", "approvedAt", "rejectedAt"];

/// Turn a raw ledger document into a `Record`, coercing malformed list
/// fields to empty lists instead of failing
pub fn normalize_document(id: &str, document: Value) -> Result<Record, StoreError> {
    let Value::Object(mut fields) = document else {
        return Err(StoreError::Corrupt {
            id: id.to_string(),
            reason: "document is not a JSON object".to_string(),
        });
    };

    if fields.get("ID").and_then(Value::as_str).is_none() {
        fields.insert("ID".to_string(), Value::String(id.to_string()));
    }
    if !fields.get("version").is_some_and(Value::is_u64) {
        debug!(record_id = %id, "Document has no usable version, treating as version 0");
        fields.insert("version".to_string(), Value::from(0u64));
    }

    for name in ARRAY_FIELDS.iter().chain(Record::ENTRY_LIST_FIELDS.iter()) {
        coerce_array(id, &mut fields, name);
    }
    for name in RECORD_TIMESTAMPS {
        coerce_timestamp(&mut fields, name);
    }
    for name in Record::ENTRY_LIST_FIELDS {
        if let Some(Value::Array(entries)) = fields.get_mut(name) {
            for entry in entries.iter_mut().filter_map(Value::as_object_mut) {
                for stamp in ENTRY_TIMESTAMPS {
                    coerce_timestamp(entry, stamp);
                }
            }
        }
    }

    serde_json::from_value(Value::Object(fields)).map_err(|e| StoreError::Corrupt {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

fn coerce_array(id: &str, fields: &mut Map<String, Value>, name: &str) {
    match fields.get(name) {
        Some(Value::Array(_)) => {}
        Some(Value::Null) | None => {
            fields.insert(name.to_string(), Value::Array(Vec::new()));
        }
        Some(other) => {
            warn!(
                record_id = %id,
                field = name,
                found = %type_name(other),
                "Replacing malformed list field with an empty list"
            );
            fields.insert(name.to_string(), Value::Array(Vec::new()));
        }
    }
}

/// Epoch milliseconds become RFC 3339; null and unparseable values are dropped
fn coerce_timestamp(fields: &mut Map<String, Value>, name: &str) {
    let replacement = match fields.get(name) {
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|ts| Value::String(ts.to_rfc3339())),
        Some(Value::String(s)) if DateTime::parse_from_rfc3339(s).is_ok() => return,
        Some(_) => None,
        None => return,
    };
    match replacement {
        Some(value) => {
            fields.insert(name.to_string(), value);
        }
        None => {
            fields.remove(name);
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
