//! The `Source` trait: an external collaborator that yields raw records.

use async_trait::async_trait;

use crate::{Result, normalize::SourceKind, record::RawRecord};

/// An external inventory source.
///
/// Object-safe so the orchestrator can hold a heterogeneous set of sources.
#[async_trait]
pub trait Source: Send + Sync {
  /// Human-readable name used in logs and reports.
  fn name(&self) -> &str;

  /// Which normalizer applies to this source's records.
  fn kind(&self) -> SourceKind;

  /// Fetch every record the source currently holds.
  ///
  /// Failures are reported as [`crate::Error::SourceFetch`].
  async fn fetch(&self) -> Result<Vec<RawRecord>>;
}
