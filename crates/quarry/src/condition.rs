//! Where conditions and boolean groups.
//!
//! A [`WhereCondition`] is a single predicate: a field path, an operator and
//! a comparison value. A [`WhereGroup`] folds its children with AND or OR and
//! may nest arbitrarily. Both evaluate against JSON rows, which is how the
//! in-memory adapter matches and how other adapters can check their own
//! translation against the reference semantics.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{QuarryError, Result};
use crate::op::CompareOp;
use crate::path::{FieldPath, Resolved};
use crate::value::{compare_coerced, is_nullish, values_equal};

/// How a condition on a path that crosses an array combines per-element results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayMode {
    /// At least one element matches ("exists").
    #[default]
    Any,
    /// Every element matches. Vacuously true for an empty array.
    All,
}

/// A single filter predicate.
///
/// # Example
///
/// ```
/// use quarry::{CompareOp, WhereCondition};
/// use serde_json::json;
///
/// let cond = WhereCondition::new("totalAmount", CompareOp::Gte, 150);
/// let row = json!({"totalAmount": 200});
/// assert!(cond.matches(row.as_object().unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhereCondition {
    /// The field path to compare.
    pub field: FieldPath,
    /// The comparison operator.
    #[serde(rename = "operator")]
    pub op: CompareOp,
    /// The value to compare against. Ignored by `isNull`/`isNotNull`.
    #[serde(default)]
    pub value: Value,
    /// Array semantics for paths that cross an array. `None` means `Any`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_mode: Option<ArrayMode>,
}

impl WhereCondition {
    /// Creates a new condition.
    pub fn new(field: impl Into<FieldPath>, op: CompareOp, value: impl Into<Value>) -> Self {
        WhereCondition {
            field: field.into(),
            op,
            value: value.into(),
            array_mode: None,
        }
    }

    /// Sets the array mode.
    pub fn with_array_mode(mut self, mode: ArrayMode) -> Self {
        self.array_mode = Some(mode);
        self
    }

    /// Checks that the value has the shape the operator needs.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| QuarryError::InvalidCondition {
            field: self.field.to_string(),
            op: self.op,
            reason: reason.to_string(),
        };

        if self.field.is_empty() {
            return Err(invalid("field path is empty"));
        }

        match self.op {
            CompareOp::In | CompareOp::Nin if !self.value.is_array() => {
                Err(invalid("expected a list of values"))
            }
            CompareOp::Between => match self.value.as_array() {
                Some(bounds) if bounds.len() == 2 => Ok(()),
                Some(bounds) => Err(invalid(&format!(
                    "expected exactly 2 bounds, got {}",
                    bounds.len()
                ))),
                None => Err(invalid("expected [min, max]")),
            },
            CompareOp::Like | CompareOp::Ilike if !self.value.is_string() => {
                Err(invalid("expected a string pattern"))
            }
            _ => Ok(()),
        }
    }

    /// Evaluates this condition against a row.
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        match self.field.resolve(row) {
            Resolved::Single(value) => self.matches_value(value),
            Resolved::Fanned(leaves) => match self.array_mode.unwrap_or_default() {
                ArrayMode::Any => leaves.iter().any(|leaf| self.matches_value(*leaf)),
                ArrayMode::All => leaves.iter().all(|leaf| self.matches_value(*leaf)),
            },
        }
    }

    /// Evaluates this condition against one resolved value.
    ///
    /// `None` (a missing field) fails every operator except `isNull`.
    pub fn matches_value(&self, field: Option<&Value>) -> bool {
        match (self.op, field) {
            (CompareOp::IsNull, _) => is_nullish(field),
            (CompareOp::IsNotNull, _) => !is_nullish(field),
            (_, None) => false,
            (CompareOp::Eq, Some(field)) => values_equal(field, &self.value),
            (CompareOp::Neq, Some(field)) => !values_equal(field, &self.value),
            (CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte, Some(field)) => {
                compare_coerced(field, &self.value).is_some_and(|ord| self.op.eval_ordering(ord))
            }
            (CompareOp::In, Some(field)) => self.list_contains(field).unwrap_or(false),
            (CompareOp::Nin, Some(field)) => self.list_contains(field).is_some_and(|found| !found),
            (CompareOp::Like, Some(field)) => self.match_pattern(field, false),
            (CompareOp::Ilike, Some(field)) => self.match_pattern(field, true),
            (CompareOp::Between, Some(field)) => self.match_between(field),
        }
    }

    fn list_contains(&self, field: &Value) -> Option<bool> {
        let list = self.value.as_array()?;
        Some(list.iter().any(|candidate| values_equal(field, candidate)))
    }

    fn match_pattern(&self, field: &Value, case_insensitive: bool) -> bool {
        match (field.as_str(), self.value.as_str()) {
            (Some(haystack), Some(needle)) if case_insensitive => haystack
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            (Some(haystack), Some(needle)) => haystack.contains(needle),
            _ => false,
        }
    }

    fn match_between(&self, field: &Value) -> bool {
        let Some(bounds) = self.value.as_array() else {
            return false;
        };
        let [min, max] = bounds.as_slice() else {
            return false;
        };
        let above_min = compare_coerced(field, min).is_some_and(|o| o.is_ge());
        let below_max = compare_coerced(field, max).is_some_and(|o| o.is_le());
        above_min && below_max
    }
}

/// Boolean connective of a [`WhereGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Every child must match. Empty = true.
    And,
    /// At least one child must match. Empty = false.
    Or,
}

/// A boolean group of conditions and nested groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereGroup {
    /// The connective folding the children.
    pub kind: GroupKind,
    /// The children, evaluated in order.
    pub conditions: Vec<WhereNode>,
}

impl WhereGroup {
    /// Creates an AND group.
    pub fn and(conditions: impl IntoIterator<Item = impl Into<WhereNode>>) -> Self {
        WhereGroup {
            kind: GroupKind::And,
            conditions: conditions.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an OR group.
    pub fn or(conditions: impl IntoIterator<Item = impl Into<WhereNode>>) -> Self {
        WhereGroup {
            kind: GroupKind::Or,
            conditions: conditions.into_iter().map(Into::into).collect(),
        }
    }

    /// Evaluates the group against a row.
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        match self.kind {
            GroupKind::And => self.conditions.iter().all(|node| node.matches(row)),
            GroupKind::Or => self.conditions.iter().any(|node| node.matches(row)),
        }
    }
}

/// Either a single condition or a nested group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WhereNode {
    Condition(WhereCondition),
    Group(WhereGroup),
}

impl WhereNode {
    /// Evaluates the node against a row.
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        match self {
            WhereNode::Condition(cond) => cond.matches(row),
            WhereNode::Group(group) => group.matches(row),
        }
    }

    /// Validates every condition in the node.
    pub fn validate(&self) -> Result<()> {
        self.visit(&mut |cond| cond.validate())
    }

    /// Calls `f` on every condition, depth first, stopping at the first error.
    pub fn visit<F>(&self, f: &mut F) -> Result<()>
    where
        F: FnMut(&WhereCondition) -> Result<()>,
    {
        match self {
            WhereNode::Condition(cond) => f(cond),
            WhereNode::Group(group) => group.conditions.iter().try_for_each(|node| node.visit(f)),
        }
    }
}

impl From<WhereCondition> for WhereNode {
    fn from(cond: WhereCondition) -> Self {
        WhereNode::Condition(cond)
    }
}

impl From<WhereGroup> for WhereNode {
    fn from(group: WhereGroup) -> Self {
        WhereNode::Group(group)
    }
}

/// Evaluates a top-level condition list, which is an implicit AND.
pub fn matches_all(nodes: &[WhereNode], row: &Map<String, Value>) -> bool {
    nodes.iter().all(|node| node.matches(row))
}
