//! Customer export read from a CSV file with a header row.

use std::path::PathBuf;

use async_trait::async_trait;
use scout_core::{normalize::SourceKind, record::RawRecord, source::Source};
use serde_json::Value as Json;

use super::fetch_error;

pub struct CustomerCsv {
  path: PathBuf,
}

impl CustomerCsv {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
}

/// Parse a header-row CSV into one string-valued record per data row.
pub fn parse_customers(data: &[u8]) -> Result<Vec<RawRecord>, csv::Error> {
  let mut reader = csv::ReaderBuilder::new()
    .trim(csv::Trim::All)
    .flexible(true)
    .from_reader(data);
  let headers = reader.headers()?.clone();

  reader
    .records()
    .map(|row| {
      let row = row?;
      Ok(
        headers
          .iter()
          .zip(row.iter())
          .map(|(h, v)| (h.to_owned(), Json::String(v.to_owned())))
          .collect(),
      )
    })
    .collect()
}

#[async_trait]
impl Source for CustomerCsv {
  fn name(&self) -> &str { "customer-csv" }

  fn kind(&self) -> SourceKind { SourceKind::Customer }

  async fn fetch(&self) -> scout_core::Result<Vec<RawRecord>> {
    let data = tokio::fs::read(&self.path)
      .await
      .map_err(|e| fetch_error(self.name(), format!("{}: {e}", self.path.display())))?;
    let records = parse_customers(&data).map_err(|e| fetch_error(self.name(), e))?;
    tracing::debug!(path = %self.path.display(), records = records.len(), "customer export read");
    Ok(records)
  }
}
