use std::marker::PhantomData;

use tracing::debug;

use super::ConditionSet;
use crate::entity::Entity;
use crate::error::Result;
use crate::session::Quarry;
use crate::spec::DeleteSpec;

/// Removes every row matching the accumulated conditions.
///
/// With no conditions, every row of the entity is removed.
#[derive(Debug)]
pub struct DeleteBuilder<T> {
    session: Quarry,
    conditions: ConditionSet,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> DeleteBuilder<T> {
    pub(crate) fn new(session: Quarry) -> Self {
        DeleteBuilder {
            session,
            conditions: ConditionSet::default(),
            _entity: PhantomData,
        }
    }

    condition_methods!();

    /// Removes the matching rows and returns how many there were.
    pub async fn execute(self) -> Result<usize> {
        self.conditions
            .validate(T::NAME, T::fields(), self.session.config())?;
        let spec = DeleteSpec {
            entity: T::NAME.to_string(),
            conditions: self.conditions.nodes().to_vec(),
        };

        let adapter = self.session.adapter();
        debug!(entity = T::NAME, adapter = adapter.name(), "delete");
        adapter.execute_delete(&spec).await
    }
}
