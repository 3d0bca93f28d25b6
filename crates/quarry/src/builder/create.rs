use std::marker::PhantomData;

use serde::Serialize;
use tracing::debug;

use crate::entity::{from_record, payload_to_record, Entity};
use crate::error::Result;
use crate::session::Quarry;
use crate::spec::{CreateSpec, Record};

/// Creates one row from a partial payload.
///
/// The payload goes to the adapter as is. Id and creation timestamp are
/// assigned by the adapter, unlike [`SaveBuilder`](super::SaveBuilder),
/// which assigns them before the call.
#[derive(Debug)]
pub struct CreateBuilder<T> {
    session: Quarry,
    data: Result<Record>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> CreateBuilder<T> {
    pub(crate) fn new(session: Quarry, payload: impl Serialize) -> Self {
        CreateBuilder {
            session,
            data: payload_to_record(T::NAME, &payload),
            _entity: PhantomData,
        }
    }

    /// Stores the row and returns it as the adapter stored it.
    ///
    /// # Errors
    ///
    /// [`QuarryError::NotAnObject`](crate::QuarryError::NotAnObject) if the
    /// payload is not an object; adapter failures unchanged.
    pub async fn execute(self) -> Result<T> {
        let data = self.data?;
        let adapter = self.session.adapter();
        debug!(entity = T::NAME, adapter = adapter.name(), "create");
        let stored = adapter
            .execute_create(CreateSpec {
                entity: T::NAME.to_string(),
                data,
            })
            .await?;
        from_record(stored)
    }
}
