//! Id generation, timestamps and child id assignment.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::{IdStrategy, QuarryConfig};

/// Generates a fresh id for a row of `entity`.
pub fn generate_id(entity: &str, config: &QuarryConfig) -> String {
    let uuid = Uuid::new_v4();
    match config.id_strategy {
        IdStrategy::Uuid => uuid.to_string(),
        IdStrategy::Prefixed => format!("{entity}_{uuid}"),
    }
}

/// Current time as an RFC 3339 UTC string with microsecond precision.
///
/// The fixed width keeps lexicographic order equal to time order.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Returns `true` if `value` identifies an existing row.
///
/// An empty string and null count as "no id"; any other value is an id.
pub fn is_present_id(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Inserts a generated id unless the record already carries one.
///
/// Returns the record's id as a string.
pub fn ensure_id(record: &mut Map<String, Value>, entity: &str, config: &QuarryConfig) -> String {
    if !is_present_id(record.get(&config.id_field)) {
        record.insert(
            config.id_field.clone(),
            Value::String(generate_id(entity, config)),
        );
    }
    id_string(record.get(&config.id_field))
}

/// Renders an id value as the string key the stores index by.
pub fn id_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Sets `field` to `value` unless the record already has a non-null value there.
pub fn stamp_if_absent(record: &mut Map<String, Value>, field: &str, value: &str) {
    if matches!(record.get(field), None | Some(Value::Null)) {
        record.insert(field.to_string(), Value::String(value.to_string()));
    }
}

/// Gives every object element of every top-level array field an id.
///
/// Only one level is scanned: arrays nested inside child elements are left
/// alone. Child ids use the name of the field holding the collection as
/// their entity prefix. Returns the number of ids assigned.
pub fn assign_child_ids(record: &mut Map<String, Value>, config: &QuarryConfig) -> usize {
    let mut assigned = 0;
    for (field, value) in record.iter_mut() {
        if field == &config.id_field {
            continue;
        }
        let Value::Array(children) = value else {
            continue;
        };
        for child in children.iter_mut() {
            let Value::Object(child) = child else {
                continue;
            };
            if !is_present_id(child.get(&config.id_field)) {
                child.insert(
                    config.id_field.clone(),
                    Value::String(generate_id(field, config)),
                );
                assigned += 1;
            }
        }
    }
    assigned
}
