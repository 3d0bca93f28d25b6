//! The storage adapter contract.
//!
//! Every backend implements [`Adapter`]. Builders compile their intent into
//! specs and hand them to whichever adapter the registry holds when the
//! terminal operation runs. The in-memory [`MemoryAdapter`] is the reference
//! semantics; other adapters must reproduce its matching, ordering,
//! pagination and error behavior against their own storage.
//!
//! # Transactions
//!
//! Transaction hooks are optional. An adapter advertises what it really
//! implements through [`AdapterCapabilities`]; the default hook bodies return
//! [`QuarryError::Unsupported`]. An adapter with no transaction support is
//! legal, and [`Quarry::transaction`](crate::Quarry::transaction) then runs
//! the work without isolation.

mod memory;

pub use memory::MemoryAdapter;

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::error::{QuarryError, Result};
use crate::spec::{CreateSpec, DeleteSpec, QueryResult, QuerySpec, Record, UpdateSpec};

/// Work run inside an adapter-native transaction.
pub type TxFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Optional behavior an adapter really implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdapterCapabilities {
    /// [`Adapter::transactional`] runs work in a native transaction.
    pub native_transactions: bool,
    /// [`Adapter::begin_transaction`], `commit` and `rollback` work.
    pub manual_transactions: bool,
    /// Each individual call is atomic with respect to other calls.
    pub serialized_writes: bool,
}

/// A storage backend.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::default()
    }

    /// Runs a list query honoring conditions, order and window.
    async fn execute_query(&self, spec: &QuerySpec) -> Result<QueryResult<Record>>;

    /// Returns the first row the query would return.
    ///
    /// Overrides must behave as [`execute_query`](Self::execute_query) with
    /// an implicit limit of 1.
    async fn execute_query_first(&self, spec: &QuerySpec) -> Result<Option<Record>> {
        let result = self.execute_query(&spec.first_row()).await?;
        Ok(result.data.into_iter().next())
    }

    /// Counts rows matching the conditions. Order and window are ignored.
    async fn execute_count(&self, spec: &QuerySpec) -> Result<usize>;

    /// Stores a new row, assigning its id and creation timestamp if absent.
    ///
    /// A row already stored under the same id fails with
    /// [`QuarryError::Conflict`](crate::QuarryError::Conflict).
    async fn execute_create(&self, spec: CreateSpec) -> Result<Record>;

    /// Merges the patch into every matching row; returns the match count.
    ///
    /// The id and creation timestamp of a stored row never change.
    async fn execute_update(&self, spec: &UpdateSpec) -> Result<usize>;

    /// Removes every matching row; returns the removed count.
    async fn execute_delete(&self, spec: &DeleteSpec) -> Result<usize>;

    async fn begin_transaction(&self) -> Result<()> {
        Err(unsupported(self.name(), "begin_transaction"))
    }

    async fn commit(&self) -> Result<()> {
        Err(unsupported(self.name(), "commit"))
    }

    async fn rollback(&self) -> Result<()> {
        Err(unsupported(self.name(), "rollback"))
    }

    /// Runs `work` inside a native transaction, committing on `Ok` and
    /// rolling back on `Err`. The work's error is returned unchanged.
    async fn transactional<'a>(&'a self, _work: TxFuture<'a>) -> Result<()> {
        Err(unsupported(self.name(), "transactional"))
    }
}

/// Builds the error returned by hooks an adapter does not implement.
pub fn unsupported(adapter: &str, operation: &'static str) -> QuarryError {
    QuarryError::Unsupported {
        adapter: adapter.to_string(),
        operation,
    }
}
