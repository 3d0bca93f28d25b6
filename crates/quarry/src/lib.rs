//! Quarry - backend-agnostic query and command engine.
//!
//! Quarry compiles fluent filter, sort, pagination and aggregate-save
//! intents into immutable specs, then hands them to whichever storage
//! adapter is active when the command runs. It provides:
//!
//! - A closed set of comparison operators with backend-independent meaning
//! - Conditions on dot paths into embedded objects and arrays (any/all)
//! - AND/OR groups that nest arbitrarily
//! - Stable multi-key ordering and page or skip/limit windows
//! - Aggregate upsert with child id assignment and timestamp stamping
//! - Transactions that degrade gracefully with what the adapter supports
//! - An in-memory reference adapter
//!
//! # Quick Start
//!
//! ```rust
//! use quarry::{CompareOp, Entity, Quarry};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize, Entity)]
//! #[serde(rename_all = "camelCase")]
//! struct PurchaseOrder {
//!     #[serde(default)]
//!     id: String,
//!     title: String,
//!     total_amount: i64,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> quarry::Result<()> {
//! let db = Quarry::in_memory();
//!
//! for (title, total) in [("PO1", 100), ("PO2", 200)] {
//!     let order = PurchaseOrder { id: String::new(), title: title.into(), total_amount: total };
//!     db.save(order).execute().await?;
//! }
//!
//! let large = db
//!     .query::<PurchaseOrder>()
//!     .and_where(PurchaseOrder::TOTAL_AMOUNT, CompareOp::Gte, 150)
//!     .execute()
//!     .await?;
//!
//! assert_eq!(large.total, 1);
//! assert_eq!(large.data[0].title, "PO2");
//! # Ok(())
//! # }
//! ```
//!
//! # Condition Semantics
//!
//! The top-level condition list is an implicit AND. A path segment that does
//! not exist yields "missing", which fails every operator except `isNull`.
//! A path that crosses an array fans out over its elements:
//!
//! ```text
//! any (default): at least one element matches   (false on an empty array)
//! all:           every element matches          (true on an empty array)
//! ```
//!
//! | Operator | Value | Match |
//! |----------|-------|-------|
//! | `eq`, `neq` | any | JSON equality, numbers compared numerically |
//! | `gt`, `gte`, `lt`, `lte` | scalar | ordered, numeric strings coerce |
//! | `in`, `nin` | list | membership |
//! | `like`, `ilike` | string | substring, `ilike` ignores case |
//! | `between` | `[min, max]` | inclusive range |
//! | `isNull`, `isNotNull` | ignored | null or missing |
//!
//! # Adapters
//!
//! Builders resolve the adapter from an [`AdapterRegistry`] at execution
//! time. Swapping the adapter affects every command issued afterwards and
//! none already running.

// Lets `#[derive(Entity)]` output, which names `::quarry`, compile in this crate
extern crate self as quarry;

pub mod adapter;
mod builder;
mod condition;
mod config;
mod entity;
mod error;
pub mod identity;
mod op;
mod ordering;
mod path;
mod registry;
mod session;
mod spec;
pub mod value;

pub use adapter::{unsupported, Adapter, AdapterCapabilities, MemoryAdapter, TxFuture};
pub use builder::{
    CreateBuilder, DeleteBuilder, Except, Only, QueryBuilder, SaveBuilder, Selection,
    UpdateBuilder, Whole,
};
pub use condition::{matches_all, ArrayMode, GroupKind, WhereCondition, WhereGroup, WhereNode};
pub use config::{IdStrategy, QuarryConfig};
pub use entity::{from_record, payload_to_record, to_record, Entity};
pub use error::{QuarryError, Result};
pub use op::{CompareOp, UnknownOperator};
pub use ordering::{compare_rows, Direction, OrderBy};
pub use path::{FieldPath, Resolved};
pub use registry::{active_adapter, global_registry, set_active_adapter, AdapterRegistry};
pub use session::{
    create, find_by_id, find_by_id_or_throw, query, remove, save, save_all, transaction, update,
    Quarry,
};
pub use spec::{
    CreateSpec, DeleteSpec, PageInfo, PageSummary, QueryResult, QuerySpec, Record, UpdateSpec,
    Window,
};
pub use value::Number;

pub use quarry_macros::Entity;
