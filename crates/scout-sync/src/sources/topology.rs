//! Stack topology read from a JSON array of stack records.

use std::path::PathBuf;

use async_trait::async_trait;
use scout_core::{normalize::SourceKind, record::RawRecord, source::Source};

use super::fetch_error;

pub struct TopologyFile {
  path: PathBuf,
}

impl TopologyFile {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
}

#[async_trait]
impl Source for TopologyFile {
  fn name(&self) -> &str { "topology-file" }

  fn kind(&self) -> SourceKind { SourceKind::Topology }

  async fn fetch(&self) -> scout_core::Result<Vec<RawRecord>> {
    let data = tokio::fs::read(&self.path)
      .await
      .map_err(|e| fetch_error(self.name(), format!("{}: {e}", self.path.display())))?;
    serde_json::from_slice(&data).map_err(|e| fetch_error(self.name(), e))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn reads_stack_array() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(
      file.path(),
      r#"[{"stack": "12", "local_location": "A", "prod_webpool": "web1201, web1202"}]"#,
    )
    .unwrap();

    let records = TopologyFile::new(file.path()).fetch().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["stack"], "12");
  }

  #[tokio::test]
  async fn non_array_is_a_fetch_failure() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), r#"{"stack": "12"}"#).unwrap();

    let err = TopologyFile::new(file.path()).fetch().await.unwrap_err();
    assert!(matches!(err, scout_core::Error::SourceFetch { ref source_name, .. } if source_name == "topology-file"));
  }
}
