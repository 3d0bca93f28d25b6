//! Proc macros for Quarry.
//!
//! # Available Macros
//!
//! - [`Entity`] - Generate the `quarry::Entity` impl and field-path constants
//!
//! The derive is re-exported from `quarry`, so `use quarry::Entity` brings
//! both the trait and the derive into scope.

mod entity;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `quarry::Entity` for a struct with named fields.
///
/// # Attributes
///
/// | Attribute | Where | Description |
/// |-----------|-------|-------------|
/// | `name = "..."` | struct | Entity name (default: the type name) |
/// | `rename_all = "..."` | struct | Naming rule for record fields |
/// | `rename = "..."` | field | Record name of this field |
/// | `skip` | field | Leave the field out of the declared list |
///
/// All of them go inside `#[entity(...)]`. Without them, the matching serde
/// attributes (`rename_all`, `rename`, `skip`) are honored, so field names
/// follow the serialized form by default.
///
/// An `#[entity(...)]` rename takes precedence over serde and is not checked
/// against it. If the two disagree, the constants and `fields()` name keys
/// that never appear in stored records, and queries on them match nothing.
/// Prefer the serde attributes alone; when both are written they must agree.
///
/// # Generated Code
///
/// 1. One constant per field holding its record name, e.g. `Order::TOTAL_AMOUNT`
/// 2. `Entity::NAME` and `Entity::fields()`, which enables path validation
///
/// A field called `name` produces an inherent `NAME` constant that shadows
/// the trait constant in `Type::NAME`; use `<Type as Entity>::NAME` for the
/// entity name in that case.
///
/// # Example
///
/// ```ignore
/// use quarry::{CompareOp, Entity};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, Entity)]
/// #[serde(rename_all = "camelCase")]
/// struct PurchaseOrder {
///     #[serde(default)]
///     id: String,
///     total_amount: i64,
///     items: Vec<LineItem>,
/// }
///
/// assert_eq!(PurchaseOrder::TOTAL_AMOUNT, "totalAmount");
/// assert_eq!(PurchaseOrder::fields(), &["id", "totalAmount", "items"]);
/// ```
#[proc_macro_derive(Entity, attributes(entity))]
pub fn entity_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::entity_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
