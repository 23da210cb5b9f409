//! # farm-db-backends
//!
//! Database backend implementations for farm-models. Provides query
//! execution and transactions on top of the [`DbExecutor`](farm_db::DbExecutor)
//! interface the model layer persists through.
//!
//! Supported backends:
//! - `SQLite` (feature `sqlite`, enabled by default)

#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]

pub mod base;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use base::{DatabaseBackend, DatabaseConfig};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;
