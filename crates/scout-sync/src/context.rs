//! The per-pass context handed to every reconciliation step.

use std::sync::Arc;

use scout_core::{store::Store, table::Table};

use crate::{
  Result,
  cache::Cache,
  writer::{BatchWriter, DEFAULT_BATCH_SIZE},
};

/// Tunables that apply to one pass.
#[derive(Debug, Clone, Copy)]
pub struct PassSettings {
  pub batch_size:         usize,
  /// Upper bound on in-flight per-record formatting tasks.
  pub format_concurrency: usize,
}

impl Default for PassSettings {
  fn default() -> Self {
    Self { batch_size: DEFAULT_BATCH_SIZE, format_concurrency: 16 }
  }
}

/// Store handle, reference cache and writer for one pass.
///
/// Owned by the orchestrator; there is no process-wide state.
pub struct SyncContext<S> {
  pub store:    Arc<S>,
  pub cache:    Cache,
  pub writer:   BatchWriter<S>,
  pub settings: PassSettings,
}

impl<S: Store> SyncContext<S> {
  pub fn new(store: Arc<S>, settings: PassSettings) -> Self {
    Self {
      writer: BatchWriter::new(Arc::clone(&store)),
      cache: Cache::new(),
      store,
      settings,
    }
  }

  /// Reload `table` into the cache; must finish before the table is read again.
  pub async fn reload(&mut self, table: Table) -> Result<usize> {
    self.cache.load(self.store.as_ref(), table).await
  }
}
