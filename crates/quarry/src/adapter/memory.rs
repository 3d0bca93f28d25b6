//! In-memory reference adapter.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use super::{Adapter, AdapterCapabilities};
use crate::config::QuarryConfig;
use crate::error::{QuarryError, Result};
use crate::identity::{ensure_id, now_timestamp, stamp_if_absent};
use crate::ordering::compare_rows;
use crate::spec::{CreateSpec, DeleteSpec, QueryResult, QuerySpec, Record, UpdateSpec};

/// Rows of one entity, keyed by id, in insertion order.
type Table = IndexMap<String, Record>;

#[derive(Default)]
struct State {
    tables: HashMap<String, Table>,
    snapshot: Option<HashMap<String, Table>>,
}

/// Keyed in-process store implementing the full adapter contract.
///
/// Each call takes the store lock once, so a single create, update, delete
/// or query is atomic. Sequences of calls from concurrent callers still
/// interleave: two read-modify-write cycles on the same row can race.
///
/// Query results are clones; mutating them never changes stored rows.
///
/// # Example
///
/// ```
/// use quarry::{Adapter, CreateSpec, MemoryAdapter, QuerySpec};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let adapter = MemoryAdapter::new();
/// let data = json!({"title": "PO1"}).as_object().cloned().unwrap();
/// let created = adapter
///     .execute_create(CreateSpec { entity: "Order".into(), data })
///     .await
///     .unwrap();
/// assert!(created.contains_key("id"));
/// assert_eq!(adapter.len("Order"), 1);
/// assert_eq!(adapter.execute_count(&QuerySpec::new("Order")).await.unwrap(), 1);
/// # }
/// ```
#[derive(Default)]
pub struct MemoryAdapter {
    config: QuarryConfig,
    state: RwLock<State>,
}

impl MemoryAdapter {
    /// Creates an empty store with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store using `config` for ids and timestamps.
    pub fn with_config(config: QuarryConfig) -> Self {
        MemoryAdapter {
            config,
            state: RwLock::default(),
        }
    }

    /// Number of stored rows for `entity`.
    pub fn len(&self, entity: &str) -> usize {
        self.state
            .read()
            .tables
            .get(entity)
            .map_or(0, IndexMap::len)
    }

    /// Returns `true` if no entity has any rows.
    pub fn is_empty(&self) -> bool {
        self.state.read().tables.values().all(IndexMap::is_empty)
    }

    /// Removes every row of every entity and drops any open transaction.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.tables.clear();
        state.snapshot = None;
    }

    fn project(&self, row: &Record, select: &[String]) -> Record {
        if select.is_empty() {
            return row.clone();
        }
        row.iter()
            .filter(|(key, _)| {
                **key == self.config.id_field
                    || select
                        .iter()
                        .any(|path| path.split('.').next() == Some(key.as_str()))
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

#[async_trait]
impl Adapter for MemoryAdapter {
    fn name(&self) -> &str {
        "memory"
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities {
            native_transactions: false,
            manual_transactions: true,
            serialized_writes: true,
        }
    }

    async fn execute_query(&self, spec: &QuerySpec) -> Result<QueryResult<Record>> {
        let started = Instant::now();
        let state = self.state.read();

        let mut matched: Vec<&Record> = state
            .tables
            .get(&spec.entity)
            .into_iter()
            .flat_map(IndexMap::values)
            .filter(|row| spec.matches(row))
            .collect();
        let total = matched.len();

        if !spec.order_by.is_empty() {
            // sort_by is stable: rows equal on every clause keep store order
            matched.sort_by(|a, b| compare_rows(a, b, &spec.order_by));
        }

        let data: Vec<Record> = spec
            .window
            .apply(matched)
            .into_iter()
            .map(|row| self.project(row, &spec.select))
            .collect();

        debug!(
            entity = %spec.entity,
            total,
            returned = data.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "memory query"
        );
        Ok(QueryResult::new(data, total, &spec.window))
    }

    async fn execute_count(&self, spec: &QuerySpec) -> Result<usize> {
        let state = self.state.read();
        let count = state
            .tables
            .get(&spec.entity)
            .map_or(0, |table| table.values().filter(|row| spec.matches(row)).count());
        debug!(entity = %spec.entity, count, "memory count");
        Ok(count)
    }

    async fn execute_create(&self, spec: CreateSpec) -> Result<Record> {
        let CreateSpec { entity, mut data } = spec;
        let id = ensure_id(&mut data, &entity, &self.config);
        stamp_if_absent(&mut data, &self.config.created_at_field, &now_timestamp());

        let mut state = self.state.write();
        let table = state.tables.entry(entity.clone()).or_default();
        if table.contains_key(&id) {
            return Err(QuarryError::Conflict { entity, id });
        }
        table.insert(id.clone(), data.clone());

        debug!(entity = %entity, id = %id, "memory create");
        Ok(data)
    }

    async fn execute_update(&self, spec: &UpdateSpec) -> Result<usize> {
        let stamp = now_timestamp();
        let mut state = self.state.write();
        let Some(table) = state.tables.get_mut(&spec.entity) else {
            debug!(entity = %spec.entity, updated = 0, "memory update");
            return Ok(0);
        };

        let mut updated = 0;
        for row in table.values_mut().filter(|row| spec.matches(row)) {
            for (key, value) in &spec.patch {
                // Identity and creation time are fixed once stored
                if *key != self.config.id_field && *key != self.config.created_at_field {
                    row.insert(key.clone(), value.clone());
                }
            }
            if !spec.patch.contains_key(&self.config.updated_at_field) {
                row.insert(
                    self.config.updated_at_field.clone(),
                    stamp.clone().into(),
                );
            }
            updated += 1;
        }

        debug!(entity = %spec.entity, updated, "memory update");
        Ok(updated)
    }

    async fn execute_delete(&self, spec: &DeleteSpec) -> Result<usize> {
        let mut state = self.state.write();
        let Some(table) = state.tables.get_mut(&spec.entity) else {
            return Ok(0);
        };

        let before = table.len();
        table.retain(|_, row| !spec.matches(row));
        let removed = before - table.len();

        debug!(entity = %spec.entity, removed, "memory delete");
        Ok(removed)
    }

    async fn begin_transaction(&self) -> Result<()> {
        let mut state = self.state.write();
        if state.snapshot.is_some() {
            return Err(QuarryError::Transaction(
                "a transaction is already open on the memory adapter".to_string(),
            ));
        }
        state.snapshot = Some(state.tables.clone());
        debug!("memory transaction begin");
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        let mut state = self.state.write();
        match state.snapshot.take() {
            Some(_) => {
                debug!("memory transaction commit");
                Ok(())
            }
            None => Err(QuarryError::Transaction(
                "commit without an open transaction".to_string(),
            )),
        }
    }

    async fn rollback(&self) -> Result<()> {
        let mut state = self.state.write();
        match state.snapshot.take() {
            Some(snapshot) => {
                state.tables = snapshot;
                debug!("memory transaction rollback");
                Ok(())
            }
            None => Err(QuarryError::Transaction(
                "rollback without an open transaction".to_string(),
            )),
        }
    }
}
