//! Aggregate save: upsert, child ids, timestamps and field selection.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{LineItem, PurchaseOrder};
use quarry::{AdapterRegistry, IdStrategy, MemoryAdapter, Quarry, QuarryConfig, QuarryError};

#[tokio::test]
async fn save_assigns_distinct_ids_to_new_children() {
    let db = Quarry::in_memory();
    let order = PurchaseOrder::new("PO1", 20).with_items(vec![
        LineItem::new("M1", 1, 10),
        LineItem::new("M2", 1, 10),
    ]);

    let saved = db.save(order).execute().await.unwrap();
    let ids: Vec<String> = saved.items.iter().filter_map(|i| i.id.clone()).collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);

    let stored = db
        .find_by_id_or_throw::<PurchaseOrder>(&saved.id)
        .await
        .unwrap();
    let stored_ids: Vec<String> = stored.items.iter().filter_map(|i| i.id.clone()).collect();
    assert_eq!(stored_ids, ids);
}

#[tokio::test]
async fn save_keeps_existing_child_ids() {
    let db = Quarry::in_memory();
    let mut kept = LineItem::new("M1", 1, 10);
    kept.id = Some("line-1".to_string());
    let order = PurchaseOrder::new("PO1", 20).with_items(vec![kept, LineItem::new("M2", 1, 10)]);

    let saved = db.save(order).execute().await.unwrap();
    assert_eq!(saved.items[0].id.as_deref(), Some("line-1"));
    assert!(saved.items[1].id.is_some());
}

#[tokio::test]
async fn fresh_saves_create_and_resaves_update() {
    let db = Quarry::in_memory();

    let first = db.save(PurchaseOrder::new("PO1", 100)).execute().await.unwrap();
    let second = db.save(PurchaseOrder::new("PO2", 200)).execute().await.unwrap();
    assert!(!first.id.is_empty());
    assert_ne!(first.id, second.id);
    assert!(first.created_at.is_some());
    assert!(first.updated_at.is_none());

    let mut changed = first.clone();
    changed.total_amount = 150;
    let resaved = db.save(changed).execute().await.unwrap();
    assert_eq!(resaved.id, first.id);
    assert_eq!(resaved.created_at, first.created_at);
    assert!(resaved.updated_at.is_some());

    assert_eq!(db.query::<PurchaseOrder>().count().await.unwrap(), 2);
    let stored = db.find_by_id_or_throw::<PurchaseOrder>(&first.id).await.unwrap();
    assert_eq!(stored.total_amount, 150);
}

#[tokio::test]
async fn only_writes_the_listed_fields() {
    let db = Quarry::in_memory();
    let saved = db.save(PurchaseOrder::new("PO1", 100)).execute().await.unwrap();

    let mut changed = saved.clone();
    changed.title = "renamed".to_string();
    changed.total_amount = 999;
    db.save(changed).only(["title"]).execute().await.unwrap();

    let stored = db.find_by_id_or_throw::<PurchaseOrder>(&saved.id).await.unwrap();
    assert_eq!(stored.title, "renamed");
    assert_eq!(stored.total_amount, 100);
    assert!(stored.updated_at.is_some());
}

#[tokio::test]
async fn except_writes_everything_else() {
    let db = Quarry::in_memory();
    let saved = db.save(PurchaseOrder::new("PO1", 100)).execute().await.unwrap();

    let mut changed = saved.clone();
    changed.title = "renamed".to_string();
    changed.total_amount = 999;
    db.save(changed).except(["title"]).execute().await.unwrap();

    let stored = db.find_by_id_or_throw::<PurchaseOrder>(&saved.id).await.unwrap();
    assert_eq!(stored.title, "PO1");
    assert_eq!(stored.total_amount, 999);
}

#[tokio::test]
async fn only_rejects_undeclared_fields() {
    let db = Quarry::in_memory();
    let saved = db.save(PurchaseOrder::new("PO1", 100)).execute().await.unwrap();

    let err = db.save(saved).only(["colour"]).execute().await.unwrap_err();
    assert!(matches!(err, QuarryError::UnknownField { ref field, .. } if field == "colour"));
}

#[tokio::test]
async fn saving_an_unknown_id_is_not_found() {
    let db = Quarry::in_memory();
    let mut ghost = PurchaseOrder::new("ghost", 1);
    ghost.id = "does-not-exist".to_string();

    let err = db.save(ghost).execute().await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(db.query::<PurchaseOrder>().count().await.unwrap(), 0);
}

#[tokio::test]
async fn save_all_runs_in_order() {
    let db = Quarry::in_memory();
    let saved = db
        .save_all(vec![
            PurchaseOrder::new("PO1", 1),
            PurchaseOrder::new("PO2", 2),
            PurchaseOrder::new("PO3", 3),
        ])
        .await
        .unwrap();

    let titles: Vec<_> = saved.iter().map(|o| o.title.as_str()).collect();
    assert_eq!(titles, ["PO1", "PO2", "PO3"]);
    let ids: HashSet<_> = saved.iter().map(|o| o.id.clone()).collect();
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn save_all_stops_at_first_failure() {
    let db = Quarry::in_memory();
    let mut ghost = PurchaseOrder::new("ghost", 2);
    ghost.id = "missing".to_string();

    let err = db
        .save_all(vec![
            PurchaseOrder::new("PO1", 1),
            ghost,
            PurchaseOrder::new("PO3", 3),
        ])
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let titles: Vec<String> = db
        .query::<PurchaseOrder>()
        .execute()
        .await
        .unwrap()
        .data
        .into_iter()
        .map(|o| o.title)
        .collect();
    assert_eq!(titles, ["PO1"]);
}

#[tokio::test]
async fn prefixed_ids_name_the_entity_and_the_child_field() {
    let config = QuarryConfig::default().with_id_strategy(IdStrategy::Prefixed);
    let adapter = Arc::new(MemoryAdapter::with_config(config.clone()));
    let db = Quarry::new(AdapterRegistry::new(adapter), config);

    let saved = db
        .save(PurchaseOrder::new("PO1", 1).with_items(vec![LineItem::new("M1", 1, 1)]))
        .execute()
        .await
        .unwrap();

    assert!(saved.id.starts_with("PurchaseOrder_"));
    let child = saved.items[0].id.as_deref().unwrap();
    assert!(child.starts_with("items_"));
}
