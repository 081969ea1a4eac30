//! Runtime configuration: an optional TOML file layered under `SCOUT_*`
//! environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
  context::PassSettings,
  sources::SanNavConfig,
  writer::DEFAULT_BATCH_SIZE,
};

/// Everything the `scout-sync` binary needs for one pass.
///
/// A source whose section is absent is skipped rather than treated as an
/// error.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  #[serde(default = "default_batch_size")]
  pub batch_size:         usize,
  #[serde(default = "default_format_concurrency")]
  pub format_concurrency: usize,
  pub customers_path:     Option<PathBuf>,
  pub topology_path:      Option<PathBuf>,
  pub sannav:             Option<SanNavConfig>,
}

fn default_store_path() -> PathBuf { PathBuf::from("scout.db") }

fn default_batch_size() -> usize { DEFAULT_BATCH_SIZE }

fn default_format_concurrency() -> usize { 16 }

impl SyncConfig {
  /// Read `path` (if it exists) and apply environment overrides such as
  /// `SCOUT_BATCH_SIZE` or `SCOUT_SANNAV__PASSWORD`.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("SCOUT")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn pass_settings(&self) -> PassSettings {
    PassSettings {
      batch_size:         self.batch_size,
      format_concurrency: self.format_concurrency,
    }
  }
}
