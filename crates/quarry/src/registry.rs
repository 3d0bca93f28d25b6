//! The active-adapter binding.
//!
//! An [`AdapterRegistry`] holds exactly one adapter. Builders look it up when
//! their terminal operation runs, never when they are constructed, so a query
//! built before a swap executes against the adapter installed after it.
//! Calls already dispatched keep the `Arc` they resolved.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::adapter::{Adapter, MemoryAdapter};

/// Shared, swappable handle to the active adapter.
///
/// Clones share the same binding.
#[derive(Clone)]
pub struct AdapterRegistry {
    active: Arc<RwLock<Arc<dyn Adapter>>>,
}

impl AdapterRegistry {
    /// Creates a registry bound to `adapter`.
    pub fn new(adapter: Arc<dyn Adapter>) -> Self {
        AdapterRegistry {
            active: Arc::new(RwLock::new(adapter)),
        }
    }

    /// Creates a registry bound to a fresh [`MemoryAdapter`].
    pub fn in_memory() -> Self {
        AdapterRegistry::new(Arc::new(MemoryAdapter::new()))
    }

    /// Replaces the active adapter, returning the previous one.
    pub fn set_active(&self, adapter: Arc<dyn Adapter>) -> Arc<dyn Adapter> {
        debug!(adapter = adapter.name(), "active adapter set");
        std::mem::replace(&mut *self.active.write(), adapter)
    }

    /// Returns the adapter installed right now.
    pub fn active(&self) -> Arc<dyn Adapter> {
        Arc::clone(&self.active.read())
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        AdapterRegistry::in_memory()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("active", &self.active.read().name())
            .finish()
    }
}

static GLOBAL: Lazy<AdapterRegistry> = Lazy::new(AdapterRegistry::in_memory);

/// The process-wide registry used by the free functions.
pub fn global_registry() -> &'static AdapterRegistry {
    &GLOBAL
}

/// Installs `adapter` in the process-wide registry.
pub fn set_active_adapter(adapter: Arc<dyn Adapter>) -> Arc<dyn Adapter> {
    GLOBAL.set_active(adapter)
}

/// Returns the adapter installed in the process-wide registry.
pub fn active_adapter() -> Arc<dyn Adapter> {
    GLOBAL.active()
}
