//! Entry points.
//!
//! A [`Quarry`] is a cheap, cloneable context: a registry handle plus the
//! identity configuration. Repository code receives one instead of reaching
//! for hidden global state. For code that does want a process-wide default,
//! the free functions at the bottom of this module delegate to
//! [`Quarry::global`], which shares the [global registry](crate::global_registry).

use std::future::Future;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::warn;

use crate::adapter::Adapter;
use crate::builder::{CreateBuilder, DeleteBuilder, QueryBuilder, SaveBuilder, UpdateBuilder};
use crate::config::QuarryConfig;
use crate::entity::Entity;
use crate::error::{QuarryError, Result};
use crate::op::CompareOp;
use crate::registry::{global_registry, AdapterRegistry};

/// Query and command context.
#[derive(Debug, Clone)]
pub struct Quarry {
    registry: AdapterRegistry,
    config: Arc<QuarryConfig>,
}

impl Quarry {
    /// Creates a context over `registry`.
    pub fn new(registry: AdapterRegistry, config: QuarryConfig) -> Self {
        Quarry {
            registry,
            config: Arc::new(config),
        }
    }

    /// Creates a context bound to `adapter` through a private registry.
    pub fn with_adapter(adapter: Arc<dyn Adapter>) -> Self {
        Quarry::new(AdapterRegistry::new(adapter), QuarryConfig::default())
    }

    /// Creates a context bound to a fresh in-memory store.
    pub fn in_memory() -> Self {
        Quarry::new(AdapterRegistry::in_memory(), QuarryConfig::default())
    }

    /// The process-wide context.
    pub fn global() -> Quarry {
        GLOBAL.clone()
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn config(&self) -> &QuarryConfig {
        &self.config
    }

    /// The adapter active right now.
    pub fn adapter(&self) -> Arc<dyn Adapter> {
        self.registry.active()
    }

    /// Starts a query over `T`.
    pub fn query<T: Entity>(&self) -> QueryBuilder<T> {
        QueryBuilder::new(self.clone())
    }

    /// Prepares a create from a partial payload.
    pub fn create<T: Entity>(&self, data: impl Serialize) -> CreateBuilder<T> {
        CreateBuilder::new(self.clone(), data)
    }

    /// Starts an update over `T`.
    pub fn update<T: Entity>(&self) -> UpdateBuilder<T> {
        UpdateBuilder::new(self.clone())
    }

    /// Starts a delete over `T`.
    pub fn remove<T: Entity>(&self) -> DeleteBuilder<T> {
        DeleteBuilder::new(self.clone())
    }

    /// Prepares an aggregate save.
    pub fn save<T: Entity>(&self, entity: T) -> SaveBuilder<T> {
        SaveBuilder::new(self.clone(), entity)
    }

    /// Looks a row up by id.
    pub async fn find_by_id<T: Entity>(&self, id: &str) -> Result<Option<T>> {
        self.query::<T>()
            .and_where(self.config.id_field.as_str(), CompareOp::Eq, id)
            .first()
            .await
    }

    /// Looks a row up by id, failing with [`QuarryError::NotFound`] if absent.
    pub async fn find_by_id_or_throw<T: Entity>(&self, id: &str) -> Result<T> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| QuarryError::NotFound {
                entity: T::NAME.to_string(),
                id: id.to_string(),
            })
    }

    /// Saves entities one after another, stopping at the first failure.
    pub async fn save_all<T: Entity>(&self, entities: impl IntoIterator<Item = T>) -> Result<Vec<T>> {
        let mut saved = Vec::new();
        for entity in entities {
            saved.push(self.save(entity).execute().await?);
        }
        Ok(saved)
    }

    /// Runs `work` with the strongest isolation the active adapter offers.
    ///
    /// Tries, in order: the adapter's native `transactional`, then
    /// begin/commit/rollback, then no isolation at all. On failure the
    /// transaction is rolled back where possible and the work's own error
    /// is returned. Cancellation is not handled here.
    ///
    /// `work` receives a context sharing this one's registry.
    pub async fn transaction<F, Fut, R>(&self, work: F) -> Result<R>
    where
        F: FnOnce(Quarry) -> Fut + Send,
        Fut: Future<Output = Result<R>> + Send,
        R: Send,
    {
        let adapter = self.adapter();
        let capabilities = adapter.capabilities();
        let session = self.clone();

        if capabilities.native_transactions {
            let mut output = None;
            let slot = &mut output;
            adapter
                .transactional(Box::pin(async move {
                    *slot = Some(work(session).await?);
                    Ok(())
                }))
                .await?;
            return output.ok_or_else(|| {
                QuarryError::Transaction(format!(
                    "adapter '{}' committed without running the work",
                    adapter.name()
                ))
            });
        }

        if capabilities.manual_transactions {
            adapter.begin_transaction().await?;
            return match work(session).await {
                Ok(value) => {
                    adapter.commit().await?;
                    Ok(value)
                }
                Err(err) => {
                    warn!(adapter = adapter.name(), error = %err, "transaction failed, rolling back");
                    if let Err(rollback_err) = adapter.rollback().await {
                        warn!(adapter = adapter.name(), error = %rollback_err, "rollback failed");
                    }
                    Err(err)
                }
            };
        }

        warn!(
            adapter = adapter.name(),
            "adapter has no transaction support, running without isolation"
        );
        work(session).await
    }
}

static GLOBAL: Lazy<Quarry> =
    Lazy::new(|| Quarry::new(global_registry().clone(), QuarryConfig::default()));

/// Starts a query over `T` on the global context.
pub fn query<T: Entity>() -> QueryBuilder<T> {
    GLOBAL.query()
}

/// Prepares a create on the global context.
pub fn create<T: Entity>(data: impl Serialize) -> CreateBuilder<T> {
    GLOBAL.create(data)
}

/// Starts an update over `T` on the global context.
pub fn update<T: Entity>() -> UpdateBuilder<T> {
    GLOBAL.update()
}

/// Starts a delete over `T` on the global context.
pub fn remove<T: Entity>() -> DeleteBuilder<T> {
    GLOBAL.remove()
}

/// Prepares an aggregate save on the global context.
pub fn save<T: Entity>(entity: T) -> SaveBuilder<T> {
    GLOBAL.save(entity)
}

/// Looks a row up by id on the global context.
pub async fn find_by_id<T: Entity>(id: &str) -> Result<Option<T>> {
    GLOBAL.find_by_id(id).await
}

/// Looks a row up by id on the global context, failing if absent.
pub async fn find_by_id_or_throw<T: Entity>(id: &str) -> Result<T> {
    GLOBAL.find_by_id_or_throw(id).await
}

/// Saves entities sequentially on the global context.
pub async fn save_all<T: Entity>(entities: impl IntoIterator<Item = T>) -> Result<Vec<T>> {
    GLOBAL.save_all(entities).await
}

/// Runs `work` in a transaction on the global context.
pub async fn transaction<F, Fut, R>(work: F) -> Result<R>
where
    F: FnOnce(Quarry) -> Fut + Send,
    Fut: Future<Output = Result<R>> + Send,
    R: Send,
{
    GLOBAL.transaction(work).await
}
