//! Base database backend trait and connection configuration.
//!
//! This module defines the [`DatabaseBackend`] trait that backend
//! implementations satisfy, along with [`DatabaseConfig`] which describes
//! where the database lives.

use farm_core::{FarmError, FarmResult, Settings};
use farm_db::{Row, SqlCompiler, Value};

/// The core trait for database backends.
///
/// All methods are async because database operations are I/O-bound. Even
/// backends that use synchronous drivers (like `rusqlite`) wrap operations
/// in `spawn_blocking` to keep the async interface.
#[async_trait::async_trait]
pub trait DatabaseBackend: Send + Sync {
    /// Returns the vendor name (e.g., "sqlite").
    fn vendor(&self) -> &str;

    /// Executes a SQL statement that does not return rows.
    ///
    /// Returns the number of rows affected.
    async fn execute(&self, sql: &str, params: &[Value]) -> FarmResult<u64>;

    /// Executes a SQL query and returns all result rows.
    async fn query(&self, sql: &str, params: &[Value]) -> FarmResult<Vec<Row>>;

    /// Executes a SQL query and returns exactly one row.
    ///
    /// Returns [`FarmError::DoesNotExist`] if no rows are returned, or
    /// [`FarmError::MultipleObjectsReturned`] if more than one row is returned.
    async fn query_one(&self, sql: &str, params: &[Value]) -> FarmResult<Row> {
        let mut rows = self.query(sql, params).await?;
        match rows.len() {
            0 => Err(FarmError::DoesNotExist("No rows returned".to_string())),
            1 => Ok(rows.remove(0)),
            n => Err(FarmError::MultipleObjectsReturned(format!(
                "Expected 1 row, got {n}"
            ))),
        }
    }

    /// Begins a new database transaction.
    async fn begin_transaction(&self) -> FarmResult<()>;

    /// Commits the current transaction.
    async fn commit(&self) -> FarmResult<()>;

    /// Rolls back the current transaction.
    async fn rollback(&self) -> FarmResult<()>;

    /// Returns a SQL compiler for this backend.
    fn compiler(&self) -> SqlCompiler {
        SqlCompiler::new()
    }
}

/// Configuration for connecting to a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// The database file path, or `:memory:`.
    pub name: String,
}

impl DatabaseConfig {
    /// The name SQLite uses for a private in-memory database.
    pub const MEMORY: &'static str = ":memory:";

    /// Creates a configuration for an in-memory SQLite database.
    pub fn sqlite_memory() -> Self {
        Self::sqlite_file(Self::MEMORY)
    }

    /// Creates a configuration for a SQLite file database.
    pub fn sqlite_file(path: impl Into<String>) -> Self {
        Self { name: path.into() }
    }

    /// Creates a configuration from the `database` setting.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::sqlite_file(settings.database.clone())
    }

    /// Returns `true` if this configuration names an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.name == Self::MEMORY
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::sqlite_memory()
    }
}
