//! Comparison operators for where conditions.
//!
//! The [`CompareOp`] enum is closed: every adapter must give each operator
//! the same meaning, so the set never grows per backend.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Comparison operator for a where condition.
///
/// Operators are grouped by the shape of value they take:
/// - **Scalar**: `Eq`, `Neq`, `Gt`, `Gte`, `Lt`, `Lte`
/// - **String**: `Like`, `Ilike` (substring containment)
/// - **List**: `In`, `Nin`
/// - **Range**: `Between` (`[min, max]`, inclusive)
/// - **Nullary**: `IsNull`, `IsNotNull` (value ignored)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompareOp {
    /// Equal (value equality).
    Eq,
    /// Not equal.
    Neq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Value is one of the given list.
    In,
    /// Value is none of the given list.
    Nin,
    /// Case-sensitive substring match.
    Like,
    /// Case-insensitive substring match.
    Ilike,
    /// Inclusive range `[min, max]`.
    Between,
    /// Field is null or missing.
    IsNull,
    /// Field is present and not null.
    IsNotNull,
}

impl CompareOp {
    /// All operators, in declaration order.
    pub const ALL: [CompareOp; 13] = [
        CompareOp::Eq,
        CompareOp::Neq,
        CompareOp::Gt,
        CompareOp::Gte,
        CompareOp::Lt,
        CompareOp::Lte,
        CompareOp::In,
        CompareOp::Nin,
        CompareOp::Like,
        CompareOp::Ilike,
        CompareOp::Between,
        CompareOp::IsNull,
        CompareOp::IsNotNull,
    ];

    /// Returns `true` if this operator compares through an [`Ordering`].
    pub fn is_ordering_op(self) -> bool {
        matches!(
            self,
            CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte
        )
    }

    /// Returns `true` if this operator expects a list value.
    pub fn is_list_op(self) -> bool {
        matches!(self, CompareOp::In | CompareOp::Nin | CompareOp::Between)
    }

    /// Returns `true` if this operator expects a string pattern.
    pub fn is_string_op(self) -> bool {
        matches!(self, CompareOp::Like | CompareOp::Ilike)
    }

    /// Returns `true` if this operator ignores its value.
    pub fn is_nullary(self) -> bool {
        matches!(self, CompareOp::IsNull | CompareOp::IsNotNull)
    }

    /// Evaluates an ordering-based operator given the field-vs-value ordering.
    ///
    /// Non-ordering operators return `false`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the wire name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Neq => "neq",
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
            CompareOp::In => "in",
            CompareOp::Nin => "nin",
            CompareOp::Like => "like",
            CompareOp::Ilike => "ilike",
            CompareOp::Between => "between",
            CompareOp::IsNull => "isNull",
            CompareOp::IsNotNull => "isNotNull",
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown operator name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown compare operator: '{0}'")]
pub struct UnknownOperator(pub String);

impl FromStr for CompareOp {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompareOp::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}
