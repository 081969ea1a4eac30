//! In-process mirror of the reference tables.
//!
//! Every mirrored table lives in a typed [`TableCache`]. A table must be
//! loaded at least once before it is searched; after a write to a mirrored
//! table the caller either reloads it or appends the row it just wrote.

use scout_core::{
  row::{
    ActiveZoneRow, CachedRow, CustomerRow, LabelRow, RunRow, StackRow, WebRow,
    WebpoolRow,
  },
  store::Store,
  table::{Label, Table},
  value::{Statement, Value},
};

use crate::{Error, Result};

// ─── TableCache ──────────────────────────────────────────────────────────────

/// Rows of one table, or nothing if the table was never loaded.
#[derive(Debug, Clone)]
pub struct TableCache<R> {
  table: Table,
  rows:  Option<Vec<R>>,
}

impl<R: CachedRow> TableCache<R> {
  pub fn new(table: Table) -> Self { Self { table, rows: None } }

  pub fn table(&self) -> Table { self.table }

  pub fn is_loaded(&self) -> bool { self.rows.is_some() }

  /// Replace the cached rows wholesale.
  pub fn replace(&mut self, rows: Vec<R>) { self.rows = Some(rows); }

  pub fn rows(&self) -> Result<&[R]> {
    self
      .rows
      .as_deref()
      .ok_or(Error::CacheNotLoaded(self.table))
  }

  /// First row whose natural key equals `key`.
  pub fn find(&self, key: &str) -> Result<Option<&R>> {
    Ok(self.rows()?.iter().find(|r| r.natural_key() == key))
  }

  /// Surrogate id for `key`, if cached.
  pub fn id_of(&self, key: &str) -> Result<Option<i64>> {
    Ok(self.find(key)?.map(CachedRow::id))
  }

  /// Add a row the caller has just written successfully.
  pub fn append(&mut self, row: R) -> Result<()> {
    self
      .rows
      .as_mut()
      .ok_or(Error::CacheNotLoaded(self.table))?
      .push(row);
    Ok(())
  }

  pub fn len(&self) -> usize { self.rows.as_ref().map_or(0, Vec::len) }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

// ─── Cache ───────────────────────────────────────────────────────────────────

/// The reference cache for one pass.
#[derive(Debug, Clone)]
pub struct Cache {
  zone:         TableCache<LabelRow>,
  switch:       TableCache<LabelRow>,
  fabric:       TableCache<LabelRow>,
  health:       TableCache<LabelRow>,
  status:       TableCache<LabelRow>,
  entity_type:  TableCache<LabelRow>,
  pub stacks:       TableCache<StackRow>,
  pub webpools:     TableCache<WebpoolRow>,
  pub webs:         TableCache<WebRow>,
  pub customers:    TableCache<CustomerRow>,
  pub runs:         TableCache<RunRow>,
  pub active_zones: TableCache<ActiveZoneRow>,
}

impl Default for Cache {
  fn default() -> Self { Self::new() }
}

impl Cache {
  pub fn new() -> Self {
    Self {
      zone:         TableCache::new(Table::Zone),
      switch:       TableCache::new(Table::Switch),
      fabric:       TableCache::new(Table::Fabric),
      health:       TableCache::new(Table::Health),
      status:       TableCache::new(Table::Status),
      entity_type:  TableCache::new(Table::EntityType),
      stacks:       TableCache::new(Table::Stacks),
      webpools:     TableCache::new(Table::Webpools),
      webs:         TableCache::new(Table::Webs),
      customers:    TableCache::new(Table::Customers),
      runs:         TableCache::new(Table::Run),
      active_zones: TableCache::new(Table::ActiveZones),
    }
  }

  pub fn label(&self, label: Label) -> &TableCache<LabelRow> {
    match label {
      Label::Zone => &self.zone,
      Label::Switch => &self.switch,
      Label::Fabric => &self.fabric,
      Label::Health => &self.health,
      Label::Status => &self.status,
      Label::EntityType => &self.entity_type,
    }
  }

  fn label_mut(&mut self, label: Label) -> &mut TableCache<LabelRow> {
    match label {
      Label::Zone => &mut self.zone,
      Label::Switch => &mut self.switch,
      Label::Fabric => &mut self.fabric,
      Label::Health => &mut self.health,
      Label::Status => &mut self.status,
      Label::EntityType => &mut self.entity_type,
    }
  }

  /// The run with the highest id, if any run has been cached.
  pub fn latest_run(&self) -> Result<Option<&RunRow>> {
    Ok(self.runs.rows()?.iter().max_by_key(|r| r.id))
  }

  /// Re-read `table` from the store, replacing whatever was cached.
  ///
  /// `activezones` is scoped to the most recent cached run, so `run` should
  /// be loaded first. Returns the number of rows now cached.
  pub async fn load<S: Store>(&mut self, store: &S, table: Table) -> Result<usize> {
    let label = match table {
      Table::Zone => Some(Label::Zone),
      Table::Switch => Some(Label::Switch),
      Table::Fabric => Some(Label::Fabric),
      Table::Health => Some(Label::Health),
      Table::Status => Some(Label::Status),
      Table::EntityType => Some(Label::EntityType),
      _ => None,
    };
    if let Some(label) = label {
      let rows = read_rows(store, table).await?;
      return Ok(replace(self.label_mut(label), rows));
    }

    match table {
      Table::Stacks => {
        let rows = read_rows(store, table).await?;
        Ok(replace(&mut self.stacks, rows))
      }
      Table::Webpools => {
        let rows = read_rows(store, table).await?;
        Ok(replace(&mut self.webpools, rows))
      }
      Table::Webs => {
        let rows = read_rows(store, table).await?;
        Ok(replace(&mut self.webs, rows))
      }
      Table::Customers => {
        let rows = read_rows(store, table).await?;
        Ok(replace(&mut self.customers, rows))
      }
      Table::Run => {
        let rows = read_rows(store, table).await?;
        Ok(replace(&mut self.runs, rows))
      }
      Table::ActiveZones => {
        let latest = if self.runs.is_loaded() {
          self.latest_run()?.map(|r| r.id)
        } else {
          None
        };
        let statement = match latest {
          Some(run_id) => Statement::with_params(
            "SELECT * FROM activezones WHERE runid = ?1",
            vec![Value::Integer(run_id)],
          ),
          None => Statement::new("SELECT * FROM activezones"),
        };
        let records = store.query(statement).await.map_err(Error::store)?;
        let rows = decode(records)?;
        Ok(replace(&mut self.active_zones, rows))
      }
      other => Err(Error::NotCached(other)),
    }
  }
}

async fn read_rows<S: Store, R: CachedRow>(store: &S, table: Table) -> Result<Vec<R>> {
  let records = store.read_all(table).await.map_err(Error::store)?;
  decode(records)
}

fn decode<R: CachedRow>(records: Vec<scout_core::value::Record>) -> Result<Vec<R>> {
  records
    .iter()
    .map(|r| R::from_record(r).map_err(Error::from))
    .collect()
}

fn replace<R: CachedRow>(cache: &mut TableCache<R>, rows: Vec<R>) -> usize {
  let count = rows.len();
  tracing::debug!(table = %cache.table(), rows = count, "cache loaded");
  cache.replace(rows);
  count
}
