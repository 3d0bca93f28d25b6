//! Error types for the quarry crate.

use thiserror::Error;

use crate::op::CompareOp;

/// Errors that can occur when compiling or executing queries and commands.
#[derive(Debug, Error)]
pub enum QuarryError {
    /// No row with the given id exists for the entity.
    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: String, id: String },

    /// A create named an id that is already stored.
    #[error("{entity} with id '{id}' already exists")]
    Conflict { entity: String, id: String },

    /// A condition value does not fit its operator.
    #[error("invalid condition on '{field}' ({op}): {reason}")]
    InvalidCondition {
        field: String,
        op: CompareOp,
        reason: String,
    },

    /// A condition or ordering names a field the entity does not declare.
    #[error("unknown field '{field}' on {entity}")]
    UnknownField { entity: String, field: String },

    /// Pagination parameters that cannot describe a page.
    #[error("invalid pagination: {0}")]
    InvalidPagination(String),

    /// A create or save payload did not serialize to a JSON object.
    #[error("{entity} payload must serialize to an object")]
    NotAnObject { entity: String },

    /// Entity encoding or decoding failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The adapter does not implement an optional operation.
    #[error("adapter '{adapter}' does not support {operation}")]
    Unsupported {
        adapter: String,
        operation: &'static str,
    },

    /// Transaction bookkeeping failed (nested begin, commit without begin).
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Failure reported by the storage backend, passed through unchanged.
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl QuarryError {
    /// Wraps a backend error so it propagates through the builders untouched.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        QuarryError::Backend(Box::new(err))
    }

    /// Returns `true` for the not-found kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, QuarryError::NotFound { .. })
    }
}

/// Result type for quarry operations.
pub type Result<T> = std::result::Result<T, QuarryError>;
