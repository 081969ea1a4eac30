//! The `Store` trait: the relational store collaborator.
//!
//! Implemented by storage backends (e.g. `scout-store-sqlite`). The sync
//! engine depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  table::Table,
  value::{Executed, Record, Statement},
};

/// Abstraction over the relational store the job reconciles into.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait Store: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Execute one write statement in its own transaction and commit it.
  ///
  /// The statement either applies completely or not at all.
  fn execute(
    &self,
    statement: Statement,
  ) -> impl Future<Output = Result<Executed, Self::Error>> + Send + '_;

  /// Run a read query and return every row, keyed by column name.
  fn query(
    &self,
    statement: Statement,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_;

  /// Read every row of `table`.
  fn read_all(
    &self,
    table: Table,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_ {
    self.query(Statement::new(format!("SELECT * FROM {table}")))
  }
}
