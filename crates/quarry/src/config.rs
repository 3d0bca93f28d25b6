//! Engine configuration.
//!
//! [`QuarryConfig`] names the identity and timestamp fields and chooses how
//! ids are generated. Every field has a default, so an empty document is a
//! valid configuration:
//!
//! ```yaml
//! id_field: id
//! created_at_field: createdAt
//! updated_at_field: updatedAt
//! id_strategy: uuid   # or: prefixed
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How new ids are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// A bare UUID v4 (`"0b1e…"`).
    #[default]
    Uuid,
    /// The entity name, an underscore, then a UUID v4 (`"PurchaseOrder_0b1e…"`).
    Prefixed,
}

/// Identity and timestamp settings shared by the session and the adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarryConfig {
    /// Name of the id field on every entity and child element.
    pub id_field: String,
    /// Name of the creation timestamp field.
    pub created_at_field: String,
    /// Name of the modification timestamp field.
    pub updated_at_field: String,
    /// Id generation strategy.
    pub id_strategy: IdStrategy,
}

impl Default for QuarryConfig {
    fn default() -> Self {
        QuarryConfig {
            id_field: "id".to_string(),
            created_at_field: "createdAt".to_string(),
            updated_at_field: "updatedAt".to_string(),
            id_strategy: IdStrategy::Uuid,
        }
    }
}

impl QuarryConfig {
    /// Parses a configuration from YAML. Missing keys take their defaults.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(QuarryConfig::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }

    /// Sets the id strategy.
    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }
}
