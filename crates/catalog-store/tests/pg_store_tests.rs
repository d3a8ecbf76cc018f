//! Integration tests for `PgStore`.

use catalog_core::committer::AtomicStore;
use catalog_core::error::StorageError;
use catalog_core::mutation::{ColumnValue, Mutation};
use catalog_core::row_reader::{RowReader, ScanQuery};
use catalog_store::PgStore;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// Upsert of a complete `products` row with sensible defaults.
fn product(id: &str, category: &str) -> Mutation {
    Mutation::insert_or_update(
        "products",
        "product_id",
        id,
        vec![
            ("name", ColumnValue::from("Lamp")),
            ("description", ColumnValue::from("")),
            ("category", ColumnValue::from(category)),
            ("base_price_numerator", ColumnValue::from(4999_i64)),
            ("base_price_denominator", ColumnValue::from(100_i64)),
            ("discount_percent", ColumnValue::Int(None)),
            ("discount_start_date", ColumnValue::Timestamp(None)),
            ("discount_end_date", ColumnValue::Timestamp(None)),
            ("status", ColumnValue::from("active")),
            ("created_at", ColumnValue::from(fixed_now())),
            ("updated_at", ColumnValue::from(fixed_now())),
            ("archived_at", ColumnValue::Timestamp(None)),
            ("version", ColumnValue::from(0_i64)),
        ],
    )
}

fn outbox(event_id: Uuid, aggregate_id: &str) -> Mutation {
    Mutation::insert_or_update(
        "outbox_events",
        "event_id",
        event_id.to_string(),
        vec![
            ("event_type", ColumnValue::from("product.created")),
            ("aggregate_id", ColumnValue::from(aggregate_id)),
            ("payload", ColumnValue::from(json!({"aggregate_id": aggregate_id}))),
            ("status", ColumnValue::from("pending")),
            ("created_at", ColumnValue::from(fixed_now())),
            ("processed_at", ColumnValue::Timestamp(None)),
        ],
    )
}

fn deactivate(id: &str, expected_version: i64) -> Mutation {
    Mutation::update(
        "products",
        "product_id",
        id,
        vec![
            ("status", ColumnValue::from("inactive")),
            ("version", ColumnValue::from(expected_version + 1)),
        ],
    )
    .with_precondition("version", ColumnValue::from(expected_version))
}

// --- apply_atomically + read_row ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_plan_writes_product_and_outbox_rows(pool: PgPool) {
    let store = PgStore::new(pool);
    let event_id = Uuid::new_v4();

    store
        .apply_atomically(&[product("p-1", "lighting"), outbox(event_id, "p-1")])
        .await
        .unwrap();

    let row = store
        .read_row("products", "product_id", "p-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row["name"], ColumnValue::from("Lamp"));
    assert_eq!(row["base_price_numerator"], ColumnValue::from(4999_i64));
    assert_eq!(row["created_at"], ColumnValue::from(fixed_now()));
    assert!(row["archived_at"].is_null());

    let event = store
        .read_row("outbox_events", "event_id", &event_id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event["status"], ColumnValue::from("pending"));
    assert_eq!(
        event["payload"],
        ColumnValue::from(json!({"aggregate_id": "p-1"}))
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_read_row_missing_is_none(pool: PgPool) {
    let store = PgStore::new(pool);

    let row = store.read_row("products", "product_id", "nope").await.unwrap();

    assert!(row.is_none());
}

// --- atomicity ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_failing_mutation_rolls_back_earlier_ones(pool: PgPool) {
    let store = PgStore::new(pool);
    store.apply_atomically(&[product("p-1", "lighting")]).await.unwrap();

    let result = store
        .apply_atomically(&[deactivate("p-1", 0), deactivate("missing", 0)])
        .await;

    assert!(matches!(result, Err(StorageError::PreconditionFailed { .. })));
    let row = store
        .read_row("products", "product_id", "p-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row["status"], ColumnValue::from("active"));
    assert_eq!(row["version"], ColumnValue::from(0_i64));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_stale_version_is_precondition_failure(pool: PgPool) {
    let store = PgStore::new(pool);
    store.apply_atomically(&[product("p-1", "lighting")]).await.unwrap();
    store.apply_atomically(&[deactivate("p-1", 0)]).await.unwrap();

    let result = store.apply_atomically(&[deactivate("p-1", 0)]).await;

    match result {
        Err(StorageError::PreconditionFailed { table, key }) => {
            assert_eq!(table, "products");
            assert_eq!(key, "p-1");
        }
        other => panic!("expected PreconditionFailed, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_unguarded_update_of_missing_row_is_row_not_found(pool: PgPool) {
    let store = PgStore::new(pool);
    let update = Mutation::update(
        "products",
        "product_id",
        "missing",
        vec![("status", ColumnValue::from("inactive"))],
    );

    let result = store.apply_atomically(&[update]).await;

    assert!(matches!(result, Err(StorageError::RowNotFound { .. })));
}

// --- scan_rows ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_scan_rows_filters_orders_and_resumes(pool: PgPool) {
    let store = PgStore::new(pool);
    store
        .apply_atomically(&[
            product("c", "tools"),
            product("a", "tools"),
            product("b", "garden"),
            product("d", "tools"),
        ])
        .await
        .unwrap();

    let query = ScanQuery::new("products", "product_id", 2)
        .filter("category", ColumnValue::from("tools"))
        .after(Some("a".to_owned()));
    let rows = store.scan_rows(&query).await.unwrap();

    let ids: Vec<&str> = rows
        .iter()
        .filter_map(|row| row["product_id"].as_text())
        .collect();
    assert_eq!(ids, ["c", "d"]);
}
