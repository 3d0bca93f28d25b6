use std::marker::PhantomData;

use serde_json::Value;
use tracing::debug;

use crate::condition::WhereCondition;
use crate::config::QuarryConfig;
use crate::entity::{from_record, to_record, Entity};
use crate::error::{QuarryError, Result};
use crate::identity::{
    assign_child_ids, ensure_id, id_string, is_present_id, now_timestamp, stamp_if_absent,
};
use crate::op::CompareOp;
use crate::session::Quarry;
use crate::spec::{CreateSpec, Record, UpdateSpec};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Whole {}
    impl Sealed for super::Only {}
    impl Sealed for super::Except {}
}

/// Field selection strategy of a [`SaveBuilder`].
pub trait Selection: sealed::Sealed {
    /// Reduces a full record to the fields an update writes.
    fn select(record: &Record, fields: &[String], config: &QuarryConfig) -> Record;
}

/// Every field is written.
#[derive(Debug)]
pub struct Whole;

/// Only the named fields (plus the id) are written.
#[derive(Debug)]
pub struct Only;

/// Every field except the named ones is written. The id is never excluded.
#[derive(Debug)]
pub struct Except;

impl Selection for Whole {
    fn select(record: &Record, _fields: &[String], _config: &QuarryConfig) -> Record {
        record.clone()
    }
}

impl Selection for Only {
    fn select(record: &Record, fields: &[String], config: &QuarryConfig) -> Record {
        record
            .iter()
            .filter(|(key, _)| {
                **key == config.id_field
                    || **key == config.updated_at_field
                    || fields.contains(key)
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl Selection for Except {
    fn select(record: &Record, fields: &[String], config: &QuarryConfig) -> Record {
        record
            .iter()
            .filter(|(key, _)| {
                **key == config.id_field
                    || **key == config.updated_at_field
                    || !fields.contains(key)
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

/// Persists a whole aggregate, choosing create or update from its id.
///
/// An entity with a non-empty id is updated; any other entity is created
/// with a generated id and creation timestamp. Object elements of every
/// top-level array field get ids of their own when they lack one.
///
/// [`only`](SaveBuilder::only) and [`except`](SaveBuilder::except) narrow
/// the fields an update writes. They move the builder into a different
/// state, so at most one of them can be applied:
///
/// ```compile_fail
/// # use quarry::{Entity, Quarry};
/// # #[derive(serde::Serialize, serde::Deserialize)]
/// # struct Order { id: String }
/// # impl Entity for Order { const NAME: &'static str = "Order"; }
/// # let order = Order { id: String::new() };
/// Quarry::in_memory().save(order).only(["title"]).except(["notes"]);
/// ```
#[derive(Debug)]
pub struct SaveBuilder<T, S = Whole> {
    session: Quarry,
    entity: T,
    fields: Vec<String>,
    _selection: PhantomData<S>,
}

impl<T: Entity> SaveBuilder<T, Whole> {
    pub(crate) fn new(session: Quarry, entity: T) -> Self {
        SaveBuilder {
            session,
            entity,
            fields: Vec::new(),
            _selection: PhantomData,
        }
    }

    /// Restricts an update to `fields`. The id is always kept.
    pub fn only(self, fields: impl IntoIterator<Item = impl Into<String>>) -> SaveBuilder<T, Only> {
        self.select(fields)
    }

    /// Writes every field but `fields` on update. The id is never removed.
    pub fn except(
        self,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> SaveBuilder<T, Except> {
        self.select(fields)
    }

    fn select<S>(self, fields: impl IntoIterator<Item = impl Into<String>>) -> SaveBuilder<T, S> {
        SaveBuilder {
            session: self.session,
            entity: self.entity,
            fields: fields.into_iter().map(Into::into).collect(),
            _selection: PhantomData,
        }
    }
}

impl<T: Entity, S: Selection> SaveBuilder<T, S> {
    /// Saves the aggregate and returns it with its assigned fields.
    ///
    /// After a create this is the row as stored. After an update it is the
    /// original entity overlaid with the written fields.
    ///
    /// # Errors
    ///
    /// [`QuarryError::NotFound`] if an update matches no stored row;
    /// [`QuarryError::UnknownField`] if a selected field is not declared.
    pub async fn execute(self) -> Result<T> {
        let config = self.session.config().clone();
        self.check_fields(&config)?;

        let mut record = to_record(&self.entity)?;
        let children = assign_child_ids(&mut record, &config);
        let adapter = self.session.adapter();

        if is_present_id(record.get(&config.id_field)) {
            record.insert(
                config.updated_at_field.clone(),
                Value::String(now_timestamp()),
            );
            let id = record
                .get(&config.id_field)
                .cloned()
                .unwrap_or(Value::Null);
            let spec = UpdateSpec {
                entity: T::NAME.to_string(),
                conditions: vec![
                    WhereCondition::new(&config.id_field, CompareOp::Eq, id.clone()).into(),
                ],
                patch: S::select(&record, &self.fields, &config),
            };

            debug!(entity = T::NAME, adapter = adapter.name(), children, "save (update)");
            let matched = adapter.execute_update(&spec).await?;
            if matched == 0 {
                return Err(QuarryError::NotFound {
                    entity: T::NAME.to_string(),
                    id: id_string(Some(&id)),
                });
            }
            from_record(record)
        } else {
            ensure_id(&mut record, T::NAME, &config);
            stamp_if_absent(&mut record, &config.created_at_field, &now_timestamp());

            debug!(entity = T::NAME, adapter = adapter.name(), children, "save (create)");
            let stored = adapter
                .execute_create(CreateSpec {
                    entity: T::NAME.to_string(),
                    data: record,
                })
                .await?;
            from_record(stored)
        }
    }

    fn check_fields(&self, config: &QuarryConfig) -> Result<()> {
        let declared = T::fields();
        if declared.is_empty() {
            return Ok(());
        }
        match self
            .fields
            .iter()
            .find(|field| {
                !declared.contains(&field.as_str())
                    && **field != config.id_field
                    && **field != config.created_at_field
                    && **field != config.updated_at_field
            })
        {
            Some(field) => Err(QuarryError::UnknownField {
                entity: T::NAME.to_string(),
                field: field.clone(),
            }),
            None => Ok(()),
        }
    }
}
