//! Core types and trait definitions for the inventory reconciliation job.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store backend and the sync engine both depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod normalize;
pub mod record;
pub mod row;
pub mod source;
pub mod store;
pub mod table;
pub mod value;

pub use error::{Error, Result};
