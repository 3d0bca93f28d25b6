use std::marker::PhantomData;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::ConditionSet;
use crate::entity::{payload_to_record, Entity};
use crate::error::{QuarryError, Result};
use crate::identity::now_timestamp;
use crate::session::Quarry;
use crate::spec::{Record, UpdateSpec};

/// Patches every row matching the accumulated conditions.
///
/// With no conditions, every row of the entity is patched.
#[derive(Debug)]
pub struct UpdateBuilder<T> {
    session: Quarry,
    conditions: ConditionSet,
    patch: Record,
    error: Option<QuarryError>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> UpdateBuilder<T> {
    pub(crate) fn new(session: Quarry) -> Self {
        UpdateBuilder {
            session,
            conditions: ConditionSet::default(),
            patch: Record::new(),
            error: None,
            _entity: PhantomData,
        }
    }

    condition_methods!();

    /// Merges the fields of `partial`, which must serialize to an object.
    pub fn set(mut self, partial: impl Serialize) -> Self {
        match payload_to_record(T::NAME, &partial) {
            Ok(fields) => self.patch.extend(fields),
            Err(err) => self.fail(err),
        }
        self
    }

    /// Sets one field.
    pub fn set_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.patch.insert(key.into(), value);
            }
            Err(err) => self.fail(err.into()),
        }
        self
    }

    /// Applies the patch, stamping the modification time, and returns the
    /// number of rows matched. No match is `Ok(0)`.
    pub async fn execute(self) -> Result<usize> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let config = self.session.config();
        self.conditions.validate(T::NAME, T::fields(), config)?;

        let mut patch = self.patch;
        patch.insert(
            config.updated_at_field.clone(),
            Value::String(now_timestamp()),
        );
        let spec = UpdateSpec {
            entity: T::NAME.to_string(),
            conditions: self.conditions.nodes().to_vec(),
            patch,
        };

        let adapter = self.session.adapter();
        debug!(entity = T::NAME, adapter = adapter.name(), "update");
        adapter.execute_update(&spec).await
    }

    fn fail(&mut self, err: QuarryError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}
