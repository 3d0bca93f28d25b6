//! Entities shared by the integration tests.

#![allow(dead_code)]

use quarry::{Entity, Quarry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Entity)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub material_code: String,
    pub quantity: i64,
    pub unit_price: i64,
}

impl LineItem {
    pub fn new(material_code: &str, quantity: i64, unit_price: i64) -> Self {
        LineItem {
            id: None,
            material_code: material_code.to_string(),
            quantity,
            unit_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Entity)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub total_amount: i64,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl PurchaseOrder {
    pub fn new(title: &str, total_amount: i64) -> Self {
        PurchaseOrder {
            id: String::new(),
            title: title.to_string(),
            total_amount,
            items: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_items(mut self, items: Vec<LineItem>) -> Self {
        self.items = items;
        self
    }
}

/// Saves one order per `(title, total)` pair, in order.
pub async fn seed(db: &Quarry, orders: &[(&str, i64)]) -> Vec<PurchaseOrder> {
    let mut saved = Vec::new();
    for (title, total) in orders {
        saved.push(
            db.save(PurchaseOrder::new(title, *total))
                .execute()
                .await
                .expect("seed order"),
        );
    }
    saved
}
