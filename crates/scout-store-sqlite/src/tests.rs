//! Integration tests for `SqliteStore` against an in-memory database.

use scout_core::{
  store::Store,
  table::Table,
  value::{Statement, Value},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn insert_zone(name: &str) -> Statement {
  Statement::with_params("INSERT INTO zone (name) VALUES (?1)", vec![Value::from(name)])
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_store_has_empty_tables() {
  let s = store().await;
  for table in Table::ID_TABLES.into_iter().chain(Table::CORE_TABLES) {
    let rows = s.read_all(table).await.unwrap();
    assert!(rows.is_empty(), "{table} should start empty");
  }
}

#[tokio::test]
async fn update_tracking_has_single_row() {
  let s = store().await;
  let rows = s.read_all(Table::UpdateTracking).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].get("stacks"), Some(&Value::Null));
}

// ─── Writes ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn execute_reports_insert_id_and_row_count() {
  let s = store().await;
  let first = s.execute(insert_zone("z_one")).await.unwrap();
  let second = s.execute(insert_zone("z_two")).await.unwrap();

  assert_eq!(first.rows_affected, 1);
  assert_eq!(second.last_insert_id, first.last_insert_id + 1);
}

#[tokio::test]
async fn multi_row_insert_is_atomic() {
  let s = store().await;
  s.execute(insert_zone("z_dup")).await.unwrap();

  // Second row violates UNIQUE(name); the first row must not survive.
  let batch = Statement::with_params(
    "INSERT INTO zone (name) VALUES (?1), (?2)",
    vec![Value::from("z_fresh"), Value::from("z_dup")],
  );
  assert!(s.execute(batch).await.is_err());

  let rows = s.read_all(Table::Zone).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].text("name").unwrap(), "z_dup");
}

#[tokio::test]
async fn quotes_round_trip_unescaped() {
  let s = store().await;
  s.execute(Statement::with_params(
    "INSERT INTO customers (contextid, customer, status, stackid) VALUES (?1, ?2, ?3, ?4)",
    vec![
      Value::from("9001"),
      Value::from("St. Mary's Clinic"),
      Value::Integer(1),
      Value::from("4"),
    ],
  ))
  .await
  .unwrap();

  let rows = s.read_all(Table::Customers).await.unwrap();
  assert_eq!(rows[0].text("customer").unwrap(), "St. Mary's Clinic");
  assert_eq!(rows[0].int("status").unwrap(), 1);
}

#[tokio::test]
async fn run_ids_are_monotonic_after_delete() {
  let s = store().await;
  let insert_run = || {
    Statement::with_params(
      "INSERT INTO run (capturedatetime) VALUES (?1)",
      vec![Value::from("2026-01-01 00:00:00")],
    )
  };
  let first = s.execute(insert_run()).await.unwrap().last_insert_id;
  s.execute(Statement::new("DELETE FROM run")).await.unwrap();
  let second = s.execute(insert_run()).await.unwrap().last_insert_id;
  assert!(second > first);
}

#[tokio::test]
async fn foreign_keys_are_enforced() {
  let s = store().await;
  let orphan = Statement::with_params(
    "INSERT INTO webpools (name, stackid) VALUES (?1, ?2)",
    vec![Value::from("wp-orphan"), Value::Integer(999)],
  );
  assert!(s.execute(orphan).await.is_err());
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn query_binds_parameters() {
  let s = store().await;
  s.execute(insert_zone("z_a")).await.unwrap();
  s.execute(insert_zone("z_b")).await.unwrap();

  let rows = s
    .query(Statement::with_params(
      "SELECT id, name FROM zone WHERE name = ?1",
      vec![Value::from("z_b")],
    ))
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].text("name").unwrap(), "z_b");
  assert!(rows[0].int("id").unwrap() > 0);
}

#[tokio::test]
async fn too_many_parameters_is_rejected_before_execution() {
  let s = store().await;
  let params = vec![Value::Null; crate::store::MAX_PARAMETERS + 1];
  let err = s
    .execute(Statement::with_params("SELECT 1", params))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::TooManyParameters { .. }));
}
