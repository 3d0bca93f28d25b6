//! The entity seam.
//!
//! An [`Entity`] is any serde type with a name. The name routes commands to a
//! store; the optional field list lets the engine reject paths the entity
//! does not declare. Both are usually generated by `#[derive(Entity)]`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{QuarryError, Result};
use crate::spec::Record;

/// A persisted type.
///
/// # Example
///
/// ```
/// use quarry::Entity;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Note {
///     id: Option<String>,
///     body: String,
/// }
///
/// impl Entity for Note {
///     const NAME: &'static str = "Note";
/// }
///
/// assert_eq!(Note::NAME, "Note");
/// assert!(Note::fields().is_empty());
/// ```
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Store or table name.
    const NAME: &'static str;

    /// Top-level field names as they appear in records.
    ///
    /// Empty means "not declared" and disables path validation.
    fn fields() -> &'static [&'static str] {
        &[]
    }
}

/// Encodes an entity as a record.
pub fn to_record<T: Entity>(entity: &T) -> Result<Record> {
    payload_to_record(T::NAME, entity)
}

/// Encodes any serializable payload as a record for `entity`.
pub fn payload_to_record(entity: &str, payload: &impl Serialize) -> Result<Record> {
    match serde_json::to_value(payload)? {
        Value::Object(map) => Ok(map),
        _ => Err(QuarryError::NotAnObject {
            entity: entity.to_string(),
        }),
    }
}

/// Decodes a record into an entity.
pub fn from_record<T: Entity>(record: Record) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}
