//! The Entity derive: names, field lists and field-path constants.

mod common;

use common::{LineItem, PurchaseOrder};
use quarry::{CompareOp, Entity, Quarry, QuarryError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Entity)]
#[entity(name = "suppliers", rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
struct Supplier {
    #[serde(default)]
    id: String,
    legal_name: String,
    #[entity(rename = "vat")]
    #[serde(rename = "vat")]
    vat_number: String,
    #[serde(skip)]
    #[allow(dead_code)]
    cached_rating: u8,
}

#[test]
fn constants_follow_serde_names() {
    assert_eq!(PurchaseOrder::TOTAL_AMOUNT, "totalAmount");
    assert_eq!(PurchaseOrder::CREATED_AT, "createdAt");
    assert_eq!(LineItem::UNIT_PRICE, "unitPrice");
    assert_eq!(
        PurchaseOrder::fields(),
        &["id", "title", "totalAmount", "items", "createdAt", "updatedAt"]
    );
    assert_eq!(<PurchaseOrder as Entity>::NAME, "PurchaseOrder");
}

#[test]
fn container_and_field_attributes() {
    assert_eq!(<Supplier as Entity>::NAME, "suppliers");
    assert_eq!(Supplier::LEGAL_NAME, "legalName");
    assert_eq!(Supplier::VAT_NUMBER, "vat");
    assert_eq!(Supplier::fields(), &["id", "legalName", "vat"]);
}

#[test]
fn constants_match_serialized_keys() {
    let supplier = Supplier {
        id: "s1".into(),
        legal_name: "Acme".into(),
        vat_number: "NL1".into(),
        cached_rating: 3,
    };
    let value = serde_json::to_value(&supplier).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, Supplier::fields());
    assert!(value.get(Supplier::LEGAL_NAME).is_some());
    assert!(value.get(Supplier::VAT_NUMBER).is_some());
}

#[tokio::test]
async fn entity_name_routes_to_its_own_table() {
    let db = Quarry::in_memory();
    db.create::<Supplier>(serde_json::json!({"legalName": "Acme", "vat": "NL1"}))
        .execute()
        .await
        .unwrap();

    let found = db
        .query::<Supplier>()
        .and_where(Supplier::VAT_NUMBER, CompareOp::Eq, "NL1")
        .first()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.legal_name, "Acme");
    assert_eq!(db.query::<PurchaseOrder>().count().await.unwrap(), 0);
}

#[tokio::test]
async fn skipped_fields_are_not_queryable() {
    let db = Quarry::in_memory();
    let err = db
        .query::<Supplier>()
        .order_asc("cachedRating")
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, QuarryError::UnknownField { ref entity, .. } if entity == "suppliers"));
}
