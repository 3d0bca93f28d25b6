//! Fluent builders for queries and commands.
//!
//! Builder methods never fail. Anything wrong with the accumulated intent
//! (a malformed condition value, a payload that is not an object, a zero
//! page size) is reported by the terminal operation, before the adapter is
//! called. The adapter itself is resolved from the session's registry only
//! when the terminal operation runs.
//!
//! [`QueryBuilder`], [`UpdateBuilder`] and [`DeleteBuilder`] share one
//! condition surface:
//!
//! | Method | Compiles to |
//! |--------|-------------|
//! | `where_eq(obj)` | one `eq` condition per key of a JSON object |
//! | `and_where(field, op, value)` | one condition |
//! | `where_nested(path, op, value)` | one condition, array mode `any` |
//! | `where_all(array, element, op, value)` | joined path, array mode `all` |
//! | `or_where(field, op, value)` | pops the previous node and wraps both in OR |
//! | `or_group(nodes)` | a flat OR of the given nodes |
//! | `where_group(group)` | any prebuilt group |
//!
//! `or_where` stacks to the left: `a.or_where(b).or_where(c)` is
//! `Or[Or[a, b], c]`, not `Or[a, b, c]`. Use `or_group` for a flat OR.

use serde::Serialize;
use serde_json::Value;

use crate::condition::{WhereCondition, WhereGroup, WhereNode};
use crate::config::QuarryConfig;
use crate::error::{QuarryError, Result};
use crate::op::CompareOp;
use crate::spec::validate_conditions;

/// Generates the shared condition methods on a builder with a
/// `conditions: ConditionSet` field.
macro_rules! condition_methods {
    () => {
        /// Adds an `eq` condition for every key of `fields`, which must
        /// serialize to a JSON object.
        pub fn where_eq(mut self, fields: impl serde::Serialize) -> Self {
            self.conditions.push_eq_map(fields);
            self
        }

        /// Adds one condition, combined with the others by AND.
        pub fn and_where(
            mut self,
            field: impl Into<$crate::FieldPath>,
            op: $crate::CompareOp,
            value: impl Into<serde_json::Value>,
        ) -> Self {
            self.conditions
                .push($crate::WhereCondition::new(field, op, value).into());
            self
        }

        /// Adds a condition on a path into embedded objects or arrays.
        ///
        /// A path that crosses an array matches when any element matches.
        pub fn where_nested(
            mut self,
            path: impl Into<$crate::FieldPath>,
            op: $crate::CompareOp,
            value: impl Into<serde_json::Value>,
        ) -> Self {
            self.conditions.push(
                $crate::WhereCondition::new(path, op, value)
                    .with_array_mode($crate::ArrayMode::Any)
                    .into(),
            );
            self
        }

        /// Adds a condition that every element of `array_field` must satisfy.
        pub fn where_all(
            mut self,
            array_field: impl Into<$crate::FieldPath>,
            element_field: impl Into<$crate::FieldPath>,
            op: $crate::CompareOp,
            value: impl Into<serde_json::Value>,
        ) -> Self {
            let path = array_field.into().join(element_field);
            self.conditions.push(
                $crate::WhereCondition::new(path, op, value)
                    .with_array_mode($crate::ArrayMode::All)
                    .into(),
            );
            self
        }

        /// ORs a condition with the previously added node.
        ///
        /// Chained calls nest to the left. With nothing added yet, the
        /// condition is added on its own.
        pub fn or_where(
            mut self,
            field: impl Into<$crate::FieldPath>,
            op: $crate::CompareOp,
            value: impl Into<serde_json::Value>,
        ) -> Self {
            self.conditions
                .or_with($crate::WhereCondition::new(field, op, value));
            self
        }

        /// Adds a flat OR over `nodes`.
        pub fn or_group(
            mut self,
            nodes: impl IntoIterator<Item = impl Into<$crate::WhereNode>>,
        ) -> Self {
            self.conditions.push($crate::WhereGroup::or(nodes).into());
            self
        }

        /// Adds a prebuilt group.
        pub fn where_group(mut self, group: $crate::WhereGroup) -> Self {
            self.conditions.push(group.into());
            self
        }
    };
}

mod create;
mod delete;
mod query;
mod save;
mod update;

pub use create::CreateBuilder;
pub use delete::DeleteBuilder;
pub use query::QueryBuilder;
pub use save::{Except, Only, SaveBuilder, Selection, Whole};
pub use update::UpdateBuilder;

/// A `where_eq` payload that could not become conditions.
#[derive(Debug, Clone)]
struct DeferredError {
    reason: String,
}

/// Accumulated top-level conditions of a builder.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConditionSet {
    nodes: Vec<WhereNode>,
    deferred: Option<DeferredError>,
}

impl ConditionSet {
    pub(crate) fn push(&mut self, node: WhereNode) {
        self.nodes.push(node);
    }

    pub(crate) fn push_eq_map(&mut self, fields: impl Serialize) {
        match serde_json::to_value(fields) {
            Ok(Value::Object(map)) => {
                for (key, value) in map {
                    self.nodes
                        .push(WhereCondition::new(key, CompareOp::Eq, value).into());
                }
            }
            Ok(other) => self.defer(format!("expected an object of field values, got {other}")),
            Err(err) => self.defer(err.to_string()),
        }
    }

    pub(crate) fn or_with(&mut self, cond: WhereCondition) {
        let node = match self.nodes.pop() {
            Some(previous) => WhereGroup::or([previous, cond.into()]).into(),
            None => cond.into(),
        };
        self.nodes.push(node);
    }

    pub(crate) fn nodes(&self) -> &[WhereNode] {
        &self.nodes
    }

    /// Reports a deferred payload error, then checks every condition.
    pub(crate) fn validate(
        &self,
        entity: &str,
        declared: &[&str],
        config: &QuarryConfig,
    ) -> Result<()> {
        if let Some(deferred) = &self.deferred {
            return Err(QuarryError::InvalidCondition {
                field: "*".to_string(),
                op: CompareOp::Eq,
                reason: deferred.reason.clone(),
            });
        }
        validate_conditions(entity, &self.nodes, declared, config)
    }

    fn defer(&mut self, reason: String) {
        // Keep the first failure
        if self.deferred.is_none() {
            self.deferred = Some(DeferredError { reason });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::GroupKind;
    use serde_json::json;

    fn cond(field: &str) -> WhereCondition {
        WhereCondition::new(field, CompareOp::Eq, 1)
    }

    #[test]
    fn eq_map_expands_keys() {
        let mut set = ConditionSet::default();
        set.push_eq_map(json!({"status": "open", "total": 5}));
        assert_eq!(set.nodes().len(), 2);
        assert!(set.validate("Order", &[], &QuarryConfig::default()).is_ok());
    }

    #[test]
    fn non_object_eq_map_fails_at_validation() {
        let mut set = ConditionSet::default();
        set.push_eq_map(vec![1, 2]);
        assert!(set.nodes().is_empty());
        assert!(matches!(
            set.validate("Order", &[], &QuarryConfig::default()),
            Err(QuarryError::InvalidCondition { .. })
        ));
    }

    #[test]
    fn or_with_nests_left() {
        let mut set = ConditionSet::default();
        set.push(cond("a").into());
        set.or_with(cond("b"));
        set.or_with(cond("c"));

        let [WhereNode::Group(outer)] = set.nodes() else {
            panic!("expected a single group");
        };
        assert_eq!(outer.kind, GroupKind::Or);
        assert_eq!(outer.conditions.len(), 2);
        let WhereNode::Group(inner) = &outer.conditions[0] else {
            panic!("expected nested group");
        };
        assert_eq!(
            inner.conditions,
            vec![WhereNode::from(cond("a")), WhereNode::from(cond("b"))]
        );
        assert_eq!(outer.conditions[1], WhereNode::from(cond("c")));
    }

    #[test]
    fn or_with_on_empty_pushes_alone() {
        let mut set = ConditionSet::default();
        set.or_with(cond("a"));
        assert_eq!(set.nodes(), [WhereNode::from(cond("a"))]);
    }
}
