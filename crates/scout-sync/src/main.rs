//! scout-sync binary.
//!
//! Reads `scout.toml` (or the path given with `--config`), opens the SQLite
//! store, runs one synchronization pass and prints the per-family report.
//! Exits non-zero if the pass aborted or any family failed.

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use scout_store_sqlite::SqliteStore;
use scout_sync::{
  Family, Orchestrator, Sources, SyncConfig,
  sources::{CustomerCsv, SanNavClient, TopologyFile},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
  Text,
  Json,
}

#[derive(Parser)]
#[command(author, version, about = "Inventory reconciliation job")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "scout.toml")]
  config: PathBuf,

  /// How to print the pass report.
  #[arg(long, value_enum, default_value = "text")]
  report: ReportFormat,

  /// Leave a family (stacks, customers, sannav) out of this pass.
  #[arg(long, value_name = "FAMILY")]
  skip: Vec<Family>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let config = SyncConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let store_path = expand_tilde(&config.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let sources = build_sources(&config)?;
  let mut orchestrator =
    Orchestrator::new(Arc::new(store), config.pass_settings(), sources).skip(cli.skip);

  let report = orchestrator.run_pass().await.context("pass aborted")?;

  match cli.report {
    ReportFormat::Text => println!("{report}"),
    ReportFormat::Json => println!(
      "{}",
      serde_json::to_string_pretty(&report).context("serialising report")?
    ),
  }

  Ok(if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn build_sources(config: &SyncConfig) -> anyhow::Result<Sources> {
  let mut sources = Sources::default();
  if let Some(path) = &config.topology_path {
    sources.stacks = Some(Arc::new(TopologyFile::new(expand_tilde(path))));
  }
  if let Some(path) = &config.customers_path {
    sources.customers = Some(Arc::new(CustomerCsv::new(expand_tilde(path))));
  }
  if let Some(sannav) = &config.sannav {
    let client = SanNavClient::new(sannav.clone()).context("failed to build SAN API client")?;
    sources.sannav = Some(Arc::new(client));
  }
  Ok(sources)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
