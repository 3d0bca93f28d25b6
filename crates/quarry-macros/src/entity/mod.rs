//! Implementation of the `#[derive(Entity)]` macro.
//!
//! This module generates the entity name, the declared field list and
//! field-path constants from a struct definition.

mod attrs;
mod derive;

pub use derive::entity_derive_impl;
