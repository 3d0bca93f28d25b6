use std::marker::PhantomData;

use tracing::{debug, trace};

use super::ConditionSet;
use crate::entity::{from_record, Entity};
use crate::error::Result;
use crate::ordering::{Direction, OrderBy};
use crate::path::FieldPath;
use crate::session::Quarry;
use crate::spec::{PageInfo, QueryResult, QuerySpec, Record, Window};

/// Fluent query over one entity type.
///
/// Methods take and return the builder by value. Terminal operations borrow
/// it, so the same builder can run several times; each run compiles a fresh
/// [`QuerySpec`] and resolves the adapter anew.
///
/// # Example
///
/// ```
/// use quarry::{CompareOp, Entity, Quarry};
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct Order {
///     #[serde(default)]
///     id: String,
///     title: String,
///     total: i64,
/// }
///
/// impl Entity for Order {
///     const NAME: &'static str = "Order";
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> quarry::Result<()> {
/// let db = Quarry::in_memory();
/// db.create::<Order>(json!({"title": "small", "total": 100})).execute().await?;
/// db.create::<Order>(json!({"title": "large", "total": 200})).execute().await?;
///
/// let big = db
///     .query::<Order>()
///     .and_where("total", CompareOp::Gte, 150)
///     .execute()
///     .await?;
/// assert_eq!(big.total, 1);
/// assert_eq!(big.data[0].title, "large");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder<T> {
    session: Quarry,
    conditions: ConditionSet,
    include: Vec<String>,
    select: Vec<String>,
    order_by: Vec<OrderBy>,
    page: Option<(usize, usize)>,
    limit: Option<usize>,
    skip: Option<usize>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> QueryBuilder<T> {
    pub(crate) fn new(session: Quarry) -> Self {
        QueryBuilder {
            session,
            conditions: ConditionSet::default(),
            include: Vec::new(),
            select: Vec::new(),
            order_by: Vec::new(),
            page: None,
            limit: None,
            skip: None,
            _entity: PhantomData,
        }
    }

    condition_methods!();

    /// Names relations to load eagerly.
    pub fn include(mut self, relations: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.include.extend(relations.into_iter().map(Into::into));
        self
    }

    /// Restricts the returned fields. The id is always returned.
    pub fn select(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.select.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Appends a sort clause.
    pub fn order_by(mut self, field: impl Into<FieldPath>, direction: Direction) -> Self {
        self.order_by.push(OrderBy::new(field, direction));
        self
    }

    /// Appends an ascending sort clause.
    pub fn order_asc(self, field: impl Into<FieldPath>) -> Self {
        self.order_by(field, Direction::Asc)
    }

    /// Appends a descending sort clause.
    pub fn order_desc(self, field: impl Into<FieldPath>) -> Self {
        self.order_by(field, Direction::Desc)
    }

    /// Requests one page. Takes precedence over `limit` and `skip`.
    pub fn paginate(mut self, page_no: usize, page_size: usize) -> Self {
        self.page = Some((page_no, page_size));
        self
    }

    /// Caps the number of rows returned.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Skips rows before the first one returned.
    pub fn skip(mut self, n: usize) -> Self {
        self.skip = Some(n);
        self
    }

    /// Compiles the accumulated intent.
    ///
    /// # Errors
    ///
    /// Fails on malformed condition values, undeclared field paths and a
    /// zero page size.
    pub fn to_spec(&self) -> Result<QuerySpec> {
        let config = self.session.config();
        self.conditions.validate(T::NAME, T::fields(), config)?;

        let window = match (self.page, self.limit, self.skip) {
            (Some((page_no, page_size)), _, _) => Window::Page(PageInfo::new(page_no, page_size)?),
            (None, None, None) => Window::All,
            (None, limit, skip) => Window::Range {
                skip: skip.unwrap_or(0),
                limit,
            },
        };

        let spec = QuerySpec {
            entity: T::NAME.to_string(),
            conditions: self.conditions.nodes().to_vec(),
            include: self.include.clone(),
            select: self.select.clone(),
            order_by: self.order_by.clone(),
            window,
        };
        spec.validate(T::fields(), config)?;
        trace!(entity = T::NAME, spec = ?spec, "compiled query");
        Ok(spec)
    }

    /// Runs the query and decodes the rows.
    pub async fn execute(&self) -> Result<QueryResult<T>> {
        self.execute_records().await?.try_map(from_record::<T>)
    }

    /// Runs the query and returns raw records, useful with `select`.
    pub async fn execute_records(&self) -> Result<QueryResult<Record>> {
        let spec = self.to_spec()?;
        let adapter = self.session.adapter();
        debug!(entity = T::NAME, adapter = adapter.name(), "query");
        adapter.execute_query(&spec).await
    }

    /// Returns the first row, or `None`.
    ///
    /// Runs the same query with an implicit limit of 1; the builder's own
    /// window is left as it was.
    pub async fn first(&self) -> Result<Option<T>> {
        let spec = self.to_spec()?;
        let adapter = self.session.adapter();
        debug!(entity = T::NAME, adapter = adapter.name(), "query first");
        adapter
            .execute_query_first(&spec)
            .await?
            .map(from_record::<T>)
            .transpose()
    }

    /// Compiles only the conditions, for counting.
    ///
    /// Order, window and projection are neither validated nor carried.
    pub fn to_count_spec(&self) -> Result<QuerySpec> {
        self.conditions
            .validate(T::NAME, T::fields(), self.session.config())?;
        let mut spec = QuerySpec::new(T::NAME);
        spec.conditions = self.conditions.nodes().to_vec();
        Ok(spec)
    }

    /// Counts matching rows, ignoring order and window.
    pub async fn count(&self) -> Result<usize> {
        let spec = self.to_count_spec()?;
        let adapter = self.session.adapter();
        debug!(entity = T::NAME, adapter = adapter.name(), "count");
        adapter.execute_count(&spec).await
    }

    /// Returns `true` if any row matches.
    pub async fn exists(&self) -> Result<bool> {
        Ok(self.count().await? > 0)
    }
}
