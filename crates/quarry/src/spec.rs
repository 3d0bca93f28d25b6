//! Compiled query and command descriptions.
//!
//! Builders accumulate intent; compiling them yields one of the immutable
//! specs in this module, which is what an [`Adapter`](crate::Adapter)
//! receives. Specs are plain data and serialize to JSON, so translation
//! adapters can log or forward them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::condition::{matches_all, WhereNode};
use crate::config::QuarryConfig;
use crate::error::{QuarryError, Result};
use crate::ordering::OrderBy;
use crate::path::FieldPath;

/// An adapter-level row: one entity encoded as a JSON object.
pub type Record = Map<String, Value>;

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based page number.
    pub page_no: usize,
    /// Rows per page. Never zero.
    pub page_size: usize,
}

impl PageInfo {
    /// Creates a page request. Page numbers below 1 are clamped to 1.
    ///
    /// # Errors
    ///
    /// Returns [`QuarryError::InvalidPagination`] for a page size of zero.
    pub fn new(page_no: usize, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(QuarryError::InvalidPagination(
                "page size must be greater than 0".to_string(),
            ));
        }
        Ok(PageInfo {
            page_no: page_no.max(1),
            page_size,
        })
    }

    /// Rows skipped before this page.
    pub fn offset(&self) -> usize {
        (self.page_no - 1).saturating_mul(self.page_size)
    }

    /// Rows on this page.
    pub fn limit(&self) -> usize {
        self.page_size
    }
}

/// Which slice of the sorted result a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Window {
    /// Every matching row.
    #[default]
    All,
    /// One page; reported back in [`QueryResult::pagination`].
    Page(PageInfo),
    /// A raw skip/limit window.
    Range { skip: usize, limit: Option<usize> },
}

impl Window {
    /// The offset and optional limit this window selects.
    pub fn bounds(&self) -> (usize, Option<usize>) {
        match *self {
            Window::All => (0, None),
            Window::Page(page) => (page.offset(), Some(page.limit())),
            Window::Range { skip, limit } => (skip, limit),
        }
    }

    /// Slices an already sorted row list.
    pub fn apply<T>(&self, rows: Vec<T>) -> Vec<T> {
        let (skip, limit) = self.bounds();
        let rows = rows.into_iter().skip(skip);
        match limit {
            Some(limit) => rows.take(limit).collect(),
            None => rows.collect(),
        }
    }
}

/// Immutable description of one query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    /// Entity name; routes the query to a store or table.
    pub entity: String,
    /// Top-level conditions, combined with AND.
    #[serde(rename = "where", default)]
    pub conditions: Vec<WhereNode>,
    /// Relations to load eagerly. Opaque to the engine.
    #[serde(default)]
    pub include: Vec<String>,
    /// Projection. Empty means every field.
    #[serde(default)]
    pub select: Vec<String>,
    /// Sort clauses, evaluated left to right.
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    /// Result window.
    #[serde(default)]
    pub window: Window,
}

impl QuerySpec {
    /// Creates an unfiltered query over `entity`.
    pub fn new(entity: impl Into<String>) -> Self {
        QuerySpec {
            entity: entity.into(),
            ..QuerySpec::default()
        }
    }

    /// A copy limited to the first row of the current window.
    ///
    /// A page window becomes a one-row range starting at the page offset, so
    /// matching and sorting stay identical to the full query. A window
    /// already limited to zero rows stays empty.
    pub fn first_row(&self) -> QuerySpec {
        let (skip, limit) = self.window.bounds();
        QuerySpec {
            window: Window::Range {
                skip,
                limit: Some(limit.map_or(1, |limit| limit.min(1))),
            },
            ..self.clone()
        }
    }

    /// A copy carrying only the conditions.
    pub fn count_only(&self) -> QuerySpec {
        QuerySpec {
            entity: self.entity.clone(),
            conditions: self.conditions.clone(),
            ..QuerySpec::default()
        }
    }

    /// Returns `true` if `row` satisfies every condition.
    pub fn matches(&self, row: &Record) -> bool {
        matches_all(&self.conditions, row)
    }

    /// Checks condition values and, when `declared` is non-empty, that every
    /// referenced path starts at a declared field.
    pub fn validate(&self, declared: &[&str], config: &QuarryConfig) -> Result<()> {
        validate_conditions(&self.entity, &self.conditions, declared, config)?;
        let fields = FieldCheck::new(&self.entity, declared, config);
        for order_by in &self.order_by {
            fields.check(&order_by.field)?;
        }
        for name in &self.select {
            fields.check(&FieldPath::parse(name))?;
        }
        Ok(())
    }
}

/// Payload for a single create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSpec {
    /// Entity name.
    pub entity: String,
    /// Fields of the new row. Id and creation timestamp may be absent.
    pub data: Record,
}

/// Patch applied to every row matching the conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSpec {
    /// Entity name.
    pub entity: String,
    /// Conditions selecting the rows, combined with AND.
    #[serde(rename = "where", default)]
    pub conditions: Vec<WhereNode>,
    /// Fields merged into each matching row.
    pub patch: Record,
}

impl UpdateSpec {
    /// Returns `true` if `row` satisfies every condition.
    pub fn matches(&self, row: &Record) -> bool {
        matches_all(&self.conditions, row)
    }
}

/// Removal of every row matching the conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteSpec {
    /// Entity name.
    pub entity: String,
    /// Conditions selecting the rows, combined with AND.
    #[serde(rename = "where", default)]
    pub conditions: Vec<WhereNode>,
}

impl DeleteSpec {
    /// Returns `true` if `row` satisfies every condition.
    pub fn matches(&self, row: &Record) -> bool {
        matches_all(&self.conditions, row)
    }
}

/// Validates a condition list for `entity`.
pub(crate) fn validate_conditions(
    entity: &str,
    conditions: &[WhereNode],
    declared: &[&str],
    config: &QuarryConfig,
) -> Result<()> {
    let fields = FieldCheck::new(entity, declared, config);
    for node in conditions {
        node.visit(&mut |cond| {
            cond.validate()?;
            fields.check(&cond.field)
        })?;
    }
    Ok(())
}

struct FieldCheck<'a> {
    entity: &'a str,
    declared: &'a [&'a str],
    config: &'a QuarryConfig,
}

impl<'a> FieldCheck<'a> {
    fn new(entity: &'a str, declared: &'a [&'a str], config: &'a QuarryConfig) -> Self {
        FieldCheck {
            entity,
            declared,
            config,
        }
    }

    fn check(&self, path: &FieldPath) -> Result<()> {
        if self.declared.is_empty() {
            return Ok(());
        }
        let Some(root) = path.root() else {
            return Ok(());
        };
        let managed = [
            self.config.id_field.as_str(),
            self.config.created_at_field.as_str(),
            self.config.updated_at_field.as_str(),
        ];
        if self.declared.contains(&root) || managed.contains(&root) {
            Ok(())
        } else {
            Err(QuarryError::UnknownField {
                entity: self.entity.to_string(),
                field: path.to_string(),
            })
        }
    }
}

/// Page numbers reported alongside a paginated result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub page_no: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl PageSummary {
    /// Summarizes `page` against a total match count.
    pub fn new(page: PageInfo, total: usize) -> Self {
        PageSummary {
            page_no: page.page_no,
            page_size: page.page_size,
            total_pages: total.div_ceil(page.page_size),
        }
    }
}

/// Rows returned by a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    /// The rows inside the requested window.
    pub data: Vec<T>,
    /// Matches before the window was applied.
    pub total: usize,
    /// Present when the query was paginated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageSummary>,
}

impl<T> QueryResult<T> {
    /// Builds a result for rows already sliced by `window`.
    pub fn new(data: Vec<T>, total: usize, window: &Window) -> Self {
        let pagination = match window {
            Window::Page(page) => Some(PageSummary::new(*page, total)),
            _ => None,
        };
        QueryResult {
            data,
            total,
            pagination,
        }
    }

    /// Converts every row, stopping at the first failure.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> std::result::Result<U, E>) -> std::result::Result<QueryResult<U>, E> {
        Ok(QueryResult {
            data: self.data.into_iter().map(f).collect::<std::result::Result<_, _>>()?,
            total: self.total,
            pagination: self.pagination,
        })
    }
}
