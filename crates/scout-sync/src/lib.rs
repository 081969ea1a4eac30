//! Reconciliation engine for the inventory job.
//!
//! Pulls raw records from the SAN-fabric API, the stack topology and the
//! customer export, diffs them against an in-process mirror of the reference
//! tables, and writes only the differences through a single batched writer.
//! [`Orchestrator::run_pass`] drives one full pass.

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod reconcile;
pub mod report;
pub mod resolver;
pub mod sources;
pub mod writer;

pub use config::SyncConfig;
pub use error::{Error, Result};
pub use orchestrator::{Orchestrator, Sources};
pub use report::{Family, PassReport};

#[cfg(test)]
mod testing;
