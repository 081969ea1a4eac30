//! Test doubles and fixtures shared by the unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use scout_core::{
  normalize::SourceKind,
  record::RawRecord,
  source::Source,
  store::Store,
  table::Table,
  value::{Columns, Executed, Record, Statement},
};
use scout_store_sqlite::SqliteStore;
use serde_json::json;
use thiserror::Error;

pub async fn memory_store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// Insert a fixture row directly, bypassing the writer.
pub async fn seed<S: Store>(store: &S, table: Table, row: Columns) {
  let names: Vec<_> = row.names().collect();
  let placeholders: Vec<_> = (1..=names.len()).map(|i| format!("?{i}")).collect();
  let sql = format!(
    "INSERT INTO {table} ({}) VALUES ({})",
    names.join(", "),
    placeholders.join(", ")
  );
  store
    .execute(Statement::with_params(sql, row.into_values()))
    .await
    .expect("seed row");
}

/// A fabric entity row whose label ids all point at id 1.
pub fn entity_columns(run_id: i64, port_id: &str) -> Columns {
  Columns::new()
    .with("runid", run_id)
    .with("id", port_id)
    .with("wwn", "10:00:00:00:00:00:00:01")
    .with("portnumber", "1")
    .with("slotnumber", "0")
    .with("remotewwn", "none")
    .with("ipaddress", "10.0.0.1")
    .with("devicename", "none")
    .with("entitytypeid", 1_i64)
    .with("fabricid", 1_i64)
    .with("healthid", 1_i64)
    .with("statusid", 1_i64)
    .with("switchid", 1_i64)
    .with("zoneid", 1_i64)
}

// ─── RecordingStore ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TestStoreError {
  #[error("injected failure")]
  Injected,
  #[error(transparent)]
  Sqlite(#[from] scout_store_sqlite::Error),
}

type FailWhen = Box<dyn Fn(&Statement) -> bool + Send + Sync>;

/// Wraps an in-memory [`SqliteStore`], logging every write statement and
/// optionally rejecting the ones a predicate selects.
pub struct RecordingStore {
  inner:     SqliteStore,
  log:       Mutex<Vec<Statement>>,
  fail_when: Mutex<Option<FailWhen>>,
}

impl RecordingStore {
  pub fn new(inner: SqliteStore) -> Self {
    Self { inner, log: Mutex::new(Vec::new()), fail_when: Mutex::new(None) }
  }

  pub fn fail_when(&self, predicate: impl Fn(&Statement) -> bool + Send + Sync + 'static) {
    *self.fail_when.lock().unwrap() = Some(Box::new(predicate));
  }

  pub fn clear_failures(&self) { *self.fail_when.lock().unwrap() = None; }

  /// Every write statement attempted so far, including rejected ones.
  pub fn statements(&self) -> Vec<Statement> { self.log.lock().unwrap().clone() }

  pub fn statements_for(&self, prefix: &str) -> Vec<Statement> {
    self
      .statements()
      .into_iter()
      .filter(|s| s.sql.starts_with(prefix))
      .collect()
  }

  pub fn reset_log(&self) { self.log.lock().unwrap().clear(); }

  pub async fn row_count(&self, table: Table) -> usize {
    self.inner.read_all(table).await.expect("read table").len()
  }

  pub async fn rows(&self, table: Table) -> Vec<Record> {
    self.inner.read_all(table).await.expect("read table")
  }
}

impl Store for RecordingStore {
  type Error = TestStoreError;

  async fn execute(&self, statement: Statement) -> Result<Executed, TestStoreError> {
    self.log.lock().unwrap().push(statement.clone());
    let rejected = self
      .fail_when
      .lock()
      .unwrap()
      .as_ref()
      .is_some_and(|f| f(&statement));
    if rejected {
      return Err(TestStoreError::Injected);
    }
    Ok(self.inner.execute(statement).await?)
  }

  async fn query(&self, statement: Statement) -> Result<Vec<Record>, TestStoreError> {
    Ok(self.inner.query(statement).await?)
  }
}

// ─── Sources ─────────────────────────────────────────────────────────────────

/// A source that returns a fixed set of records, or fails.
pub struct StaticSource {
  pub kind:    SourceKind,
  pub records: Result<Vec<RawRecord>, String>,
}

impl StaticSource {
  pub fn ok(kind: SourceKind, records: Vec<RawRecord>) -> Self {
    Self { kind, records: Ok(records) }
  }

  pub fn failing(kind: SourceKind, reason: &str) -> Self {
    Self { kind, records: Err(reason.to_owned()) }
  }
}

#[async_trait]
impl Source for StaticSource {
  fn name(&self) -> &str { "static" }

  fn kind(&self) -> SourceKind { self.kind }

  async fn fetch(&self) -> scout_core::Result<Vec<RawRecord>> {
    self.records.clone().map_err(|reason| scout_core::Error::SourceFetch {
      source_name: "static".into(),
      reason,
    })
  }
}

// ─── Raw record fixtures ─────────────────────────────────────────────────────

pub fn raw(value: serde_json::Value) -> RawRecord {
  match value {
    serde_json::Value::Object(map) => map,
    _ => panic!("fixture must be an object"),
  }
}

pub fn stack_raw(stack: &str, prod_location: &str) -> RawRecord {
  raw(json!({
    "stack": stack,
    "local_location": "A",
    "prod_location": prod_location,
    "remote_location": "C",
    "prod_webpool_name": format!("wp-prod-{stack}"),
    "prod_webpool": format!("web{stack}01,web{stack}02"),
    "remote_webpool_name": format!("wp-dr-{stack}"),
    "remote_webpool": format!("web{stack}51"),
  }))
}

pub fn customer_raw(id: &str, name: &str, live: &str) -> RawRecord {
  raw(json!({ "ID": id, "NAME": name, "L": live, "STACKNUMBER": "1" }))
}

pub fn port_raw(id: u32, switch: &str, zones: &[&str]) -> RawRecord {
  raw(json!({
    "id": id,
    "wwn": format!("10:00:00:05:1e:00:00:{:02x}", id % 256),
    "portNumber": id % 48,
    "slotNumber": 0,
    "ipAddress": "10.1.1.5",
    "switchName": switch,
    "fabricName": "fab-a",
    "health": "HEALTHY",
    "status": "Online",
    "zoneAlias": "alias-a",
    "connectedDeviceType": "Initiator",
    "remoteDevice": format!("host-{id}"),
    "remoteNodeWwn": "20:00:00:25:b5:00:00:01",
    "activeZones": zones,
  }))
}
