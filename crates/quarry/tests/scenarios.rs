//! End-to-end behavior against the in-memory adapter.

mod common;

use common::{seed, LineItem, PurchaseOrder};
use quarry::{CompareOp, PageSummary, Quarry, QuarryError, WhereCondition};
use serde_json::json;

// ============================================================================
// Create, find, delete
// ============================================================================

#[tokio::test]
async fn create_then_find_then_delete() {
    let db = Quarry::in_memory();

    let created = db
        .create::<PurchaseOrder>(json!({
            "title": "PO1",
            "items": [{"materialCode": "M1", "quantity": 2, "unitPrice": 10}],
        }))
        .execute()
        .await
        .unwrap();
    assert!(!created.id.is_empty());
    assert!(created.created_at.is_some());

    let found = db
        .find_by_id::<PurchaseOrder>(&created.id)
        .await
        .unwrap()
        .expect("row exists");
    assert_eq!(found.title, "PO1");
    assert_eq!(found, created);

    let removed = db
        .remove::<PurchaseOrder>()
        .and_where("id", CompareOp::Eq, created.id.as_str())
        .execute()
        .await
        .unwrap();
    assert_eq!(removed, 1);

    let exists = db
        .query::<PurchaseOrder>()
        .and_where("id", CompareOp::Eq, created.id.as_str())
        .exists()
        .await
        .unwrap();
    assert!(!exists);
}

#[tokio::test]
async fn create_with_a_taken_id_conflicts() {
    let db = Quarry::in_memory();
    let original = db
        .create::<PurchaseOrder>(json!({"id": "po-1", "title": "PO1"}))
        .execute()
        .await
        .unwrap();

    let err = db
        .create::<PurchaseOrder>(json!({"id": "po-1", "title": "PO2"}))
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, QuarryError::Conflict { ref id, .. } if id == "po-1"));

    let stored = db.find_by_id_or_throw::<PurchaseOrder>("po-1").await.unwrap();
    assert_eq!(stored, original);
}

#[tokio::test]
async fn find_by_id_or_throw_reports_entity_and_id() {
    let db = Quarry::in_memory();
    let err = db
        .find_by_id_or_throw::<PurchaseOrder>("missing")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "PurchaseOrder with id 'missing' not found");
    assert!(db.find_by_id::<PurchaseOrder>("missing").await.unwrap().is_none());
}

// ============================================================================
// Filtering
// ============================================================================

#[tokio::test]
async fn gte_filter_returns_matching_row_and_total() {
    let db = Quarry::in_memory();
    seed(&db, &[("PO1", 100), ("PO2", 200)]).await;

    let result = db
        .query::<PurchaseOrder>()
        .and_where(PurchaseOrder::TOTAL_AMOUNT, CompareOp::Gte, 150)
        .execute()
        .await
        .unwrap();

    assert_eq!(result.total, 1);
    assert_eq!(result.data.len(), 1);
    assert_eq!(result.data[0].total_amount, 200);
    assert!(result.pagination.is_none());
}

#[tokio::test]
async fn list_and_string_operators() {
    let db = Quarry::in_memory();
    seed(&db, &[("Steel bolts", 10), ("steel nuts", 20), ("Copper wire", 30)]).await;

    let titles = |result: quarry::QueryResult<PurchaseOrder>| -> Vec<String> {
        result.data.into_iter().map(|o| o.title).collect()
    };

    let like = db
        .query::<PurchaseOrder>()
        .and_where("title", CompareOp::Like, "steel")
        .execute()
        .await
        .unwrap();
    assert_eq!(titles(like), ["steel nuts"]);

    let ilike = db
        .query::<PurchaseOrder>()
        .and_where("title", CompareOp::Ilike, "STEEL")
        .execute()
        .await
        .unwrap();
    assert_eq!(titles(ilike), ["Steel bolts", "steel nuts"]);

    let within = db
        .query::<PurchaseOrder>()
        .and_where("totalAmount", CompareOp::In, json!([10, 30]))
        .execute()
        .await
        .unwrap();
    assert_eq!(titles(within), ["Steel bolts", "Copper wire"]);

    let between = db
        .query::<PurchaseOrder>()
        .and_where("totalAmount", CompareOp::Between, json!([15, 30]))
        .count()
        .await
        .unwrap();
    assert_eq!(between, 2);
}

#[tokio::test]
async fn or_where_wraps_the_previous_condition() {
    let db = Quarry::in_memory();
    seed(&db, &[("PO1", 100), ("PO2", 200), ("PO3", 300)]).await;

    // (total >= 250 OR title = PO1) AND title != PO3
    let result = db
        .query::<PurchaseOrder>()
        .and_where("totalAmount", CompareOp::Gte, 250)
        .or_where("title", CompareOp::Eq, "PO1")
        .and_where("title", CompareOp::Neq, "PO3")
        .execute()
        .await
        .unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.data[0].title, "PO1");

    let flat = db
        .query::<PurchaseOrder>()
        .or_group([
            WhereCondition::new("title", CompareOp::Eq, "PO2"),
            WhereCondition::new("title", CompareOp::Eq, "PO3"),
        ])
        .count()
        .await
        .unwrap();
    assert_eq!(flat, 2);
}

#[tokio::test]
async fn nested_any_versus_all() {
    let db = Quarry::in_memory();
    for (title, prices) in [("mixed", vec![10, 50]), ("dear", vec![60, 70]), ("empty", vec![])] {
        let items = prices
            .into_iter()
            .map(|price| LineItem::new("M1", 1, price))
            .collect();
        db.save(PurchaseOrder::new(title, 0).with_items(items))
            .execute()
            .await
            .unwrap();
    }

    let any = db
        .query::<PurchaseOrder>()
        .where_nested("items.unitPrice", CompareOp::Gt, 40)
        .order_asc("title")
        .execute()
        .await
        .unwrap();
    let any: Vec<_> = any.data.into_iter().map(|o| o.title).collect();
    assert_eq!(any, ["dear", "mixed"]);

    let all = db
        .query::<PurchaseOrder>()
        .where_all("items", "unitPrice", CompareOp::Gt, 40)
        .order_asc("title")
        .execute()
        .await
        .unwrap();
    let all: Vec<_> = all.data.into_iter().map(|o| o.title).collect();
    assert_eq!(all, ["dear", "empty"]);
}

#[tokio::test]
async fn where_eq_matches_every_key() {
    let db = Quarry::in_memory();
    seed(&db, &[("PO1", 100), ("PO1", 200), ("PO2", 100)]).await;

    let count = db
        .query::<PurchaseOrder>()
        .where_eq(json!({"title": "PO1", "totalAmount": 100}))
        .count()
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn malformed_and_unknown_conditions_fail_before_the_adapter() {
    let db = Quarry::in_memory();
    seed(&db, &[("PO1", 100)]).await;

    let err = db
        .query::<PurchaseOrder>()
        .and_where("totalAmount", CompareOp::Between, json!([1]))
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, QuarryError::InvalidCondition { .. }));

    let err = db
        .query::<PurchaseOrder>()
        .and_where("colour", CompareOp::Eq, "red")
        .count()
        .await
        .unwrap_err();
    assert!(matches!(err, QuarryError::UnknownField { ref field, .. } if field == "colour"));

    let err = db
        .query::<PurchaseOrder>()
        .where_eq(json!(["not", "an", "object"]))
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, QuarryError::InvalidCondition { .. }));
}

// ============================================================================
// Ordering and pagination
// ============================================================================

#[tokio::test]
async fn second_page_sorted_by_created_at_desc() {
    let db = Quarry::in_memory();
    for day in 1..=5 {
        db.create::<PurchaseOrder>(json!({
            "title": format!("PO{day}"),
            "createdAt": format!("2024-01-0{day}T00:00:00.000000Z"),
        }))
        .execute()
        .await
        .unwrap();
    }

    let page = db
        .query::<PurchaseOrder>()
        .order_desc("createdAt")
        .paginate(2, 2)
        .execute()
        .await
        .unwrap();

    let titles: Vec<_> = page.data.iter().map(|o| o.title.as_str()).collect();
    assert_eq!(titles, ["PO3", "PO2"]);
    assert_eq!(page.total, 5);
    assert_eq!(
        page.pagination,
        Some(PageSummary {
            page_no: 2,
            page_size: 2,
            total_pages: 3,
        })
    );
}

#[tokio::test]
async fn skip_limit_and_first() {
    let db = Quarry::in_memory();
    seed(&db, &[("a", 3), ("b", 1), ("c", 2)]).await;

    let window = db
        .query::<PurchaseOrder>()
        .order_asc("totalAmount")
        .skip(1)
        .limit(1)
        .execute()
        .await
        .unwrap();
    assert_eq!(window.total, 3);
    assert_eq!(window.data[0].title, "c");

    let first = db
        .query::<PurchaseOrder>()
        .order_desc("totalAmount")
        .first()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.title, "a");
}

#[tokio::test]
async fn zero_limit_first_matches_execute() {
    let db = Quarry::in_memory();
    seed(&db, &[("a", 1), ("b", 2)]).await;

    let query = db.query::<PurchaseOrder>().limit(0);
    assert!(query.execute().await.unwrap().data.is_empty());
    assert_eq!(query.first().await.unwrap(), None);
}

#[tokio::test]
async fn count_ignores_pagination() {
    let db = Quarry::in_memory();
    seed(&db, &[("a", 1), ("b", 2), ("c", 3)]).await;

    let count = db
        .query::<PurchaseOrder>()
        .and_where("totalAmount", CompareOp::Gte, 2)
        .paginate(1, 0)
        .count()
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn zero_page_size_is_rejected() {
    let db = Quarry::in_memory();
    let err = db
        .query::<PurchaseOrder>()
        .paginate(1, 0)
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, QuarryError::InvalidPagination(_)));
}

#[tokio::test]
async fn select_projects_rows_but_keeps_the_id() {
    let db = Quarry::in_memory();
    seed(&db, &[("PO1", 100)]).await;

    let result = db
        .query::<PurchaseOrder>()
        .select(["title"])
        .execute_records()
        .await
        .unwrap();
    let row = &result.data[0];
    assert_eq!(row.len(), 2);
    assert!(row.contains_key("id"));
    assert_eq!(row["title"], json!("PO1"));
}

// ============================================================================
// Update and delete
// ============================================================================

#[tokio::test]
async fn update_reports_matches_and_stamps_updated_at() {
    let db = Quarry::in_memory();
    seed(&db, &[("PO1", 100), ("PO2", 200), ("PO3", 300)]).await;

    let matched = db
        .update::<PurchaseOrder>()
        .and_where("totalAmount", CompareOp::Lt, 250)
        .set(json!({"title": "cheap"}))
        .execute()
        .await
        .unwrap();
    assert_eq!(matched, 2);

    let cheap = db
        .query::<PurchaseOrder>()
        .and_where("title", CompareOp::Eq, "cheap")
        .execute()
        .await
        .unwrap();
    assert_eq!(cheap.total, 2);
    assert!(cheap.data.iter().all(|o| o.updated_at.is_some()));

    let none = db
        .update::<PurchaseOrder>()
        .and_where("title", CompareOp::Eq, "nothing")
        .set_field("totalAmount", 0)
        .execute()
        .await
        .unwrap();
    assert_eq!(none, 0);
}

#[tokio::test]
async fn created_at_survives_updates_and_saves() {
    let db = Quarry::in_memory();
    let saved = seed(&db, &[("PO1", 100)]).await.remove(0);
    let created_at = saved.created_at.clone();
    assert!(created_at.is_some());

    db.update::<PurchaseOrder>()
        .and_where("id", CompareOp::Eq, saved.id.as_str())
        .set_field("createdAt", "1999-01-01T00:00:00.000000Z")
        .execute()
        .await
        .unwrap();
    let reloaded = db.find_by_id_or_throw::<PurchaseOrder>(&saved.id).await.unwrap();
    assert_eq!(reloaded.created_at, created_at);

    let mut edited = reloaded;
    edited.title = "PO1b".into();
    edited.created_at = Some("1999-01-01T00:00:00.000000Z".into());
    db.save(edited).execute().await.unwrap();
    let reloaded = db.find_by_id_or_throw::<PurchaseOrder>(&saved.id).await.unwrap();
    assert_eq!(reloaded.title, "PO1b");
    assert_eq!(reloaded.created_at, created_at);
}

#[tokio::test]
async fn update_with_non_object_patch_fails() {
    let db = Quarry::in_memory();
    let err = db
        .update::<PurchaseOrder>()
        .set("just a string")
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, QuarryError::NotAnObject { .. }));
}

#[tokio::test]
async fn delete_without_match_is_zero() {
    let db = Quarry::in_memory();
    seed(&db, &[("PO1", 100)]).await;

    let removed = db
        .remove::<PurchaseOrder>()
        .and_where("title", CompareOp::Eq, "PO9")
        .execute()
        .await
        .unwrap();
    assert_eq!(removed, 0);
    assert_eq!(db.query::<PurchaseOrder>().count().await.unwrap(), 1);
}
