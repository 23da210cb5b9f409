//! SQLite database backend using `rusqlite`.
//!
//! This module provides the [`SqliteBackend`] which implements the
//! [`DatabaseBackend`](crate::base::DatabaseBackend) trait and the model
//! layer's [`DbExecutor`] using `rusqlite` wrapped in
//! `tokio::task::spawn_blocking` for async compatibility.
//!
//! Features:
//! - WAL mode enabled for file-based databases
//! - In-memory database support via `:memory:` path (great for testing)
//! - Simple `Mutex`-based concurrency control

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use farm_core::{FarmError, FarmResult};
use farm_db::value::DATETIME_FORMAT;
use farm_db::{DbExecutor, Row, Value};
use rusqlite::types::ValueRef;
use tokio::sync::Mutex;

use crate::base::{DatabaseBackend, DatabaseConfig};

/// A SQLite database backend.
///
/// Uses `rusqlite` for database access with a `Mutex`-based concurrency
/// model. All operations are run via `tokio::task::spawn_blocking` to
/// avoid blocking the async runtime.
pub struct SqliteBackend {
    /// The path to the database file (or ":memory:").
    path: PathBuf,
    /// The connection, guarded by an async mutex.
    conn: Arc<Mutex<rusqlite::Connection>>,
}

impl SqliteBackend {
    /// Opens a new SQLite database at the given path.
    ///
    /// If the path is `:memory:`, an in-memory database is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(path: impl Into<PathBuf>) -> FarmResult<Self> {
        let path = path.into();
        let memory = path.to_str() == Some(DatabaseConfig::MEMORY);
        let conn = if memory {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&path)
        }
        .map_err(|e| FarmError::OperationalError(format!("SQLite open failed: {e}")))?;

        let pragmas = if memory {
            "PRAGMA foreign_keys=ON;"
        } else {
            "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;"
        };
        conn.execute_batch(pragmas)
            .map_err(|e| FarmError::OperationalError(format!("Failed to set pragmas: {e}")))?;

        tracing::debug!(path = %path.display(), "opened sqlite database");
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory database (convenience constructor).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn memory() -> FarmResult<Self> {
        Self::open(DatabaseConfig::MEMORY)
    }

    /// Opens the database a [`DatabaseConfig`] describes.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn from_config(config: &DatabaseConfig) -> FarmResult<Self> {
        Self::open(&config.name)
    }

    /// Returns the database file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Binds `Value`s to a `rusqlite` statement.
    ///
    /// Values that reach here without passing through a column type are
    /// mapped onto SQLite storage classes: JSON and timestamps as text, an
    /// IPv4 address as its integer. IPv6 addresses have no storage form.
    fn bind_params(stmt: &mut rusqlite::Statement<'_>, params: &[Value]) -> FarmResult<()> {
        for (i, param) in params.iter().enumerate() {
            let idx = i + 1;
            match param {
                Value::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null),
                Value::Bool(b) => stmt.raw_bind_parameter(idx, b),
                Value::Int(v) => stmt.raw_bind_parameter(idx, v),
                Value::Float(v) => stmt.raw_bind_parameter(idx, v),
                Value::String(s) => stmt.raw_bind_parameter(idx, s.as_str()),
                Value::Bytes(b) => stmt.raw_bind_parameter(idx, b.as_slice()),
                Value::Json(j) => stmt.raw_bind_parameter(idx, j.to_string().as_str()),
                Value::DateTime(dt) => {
                    stmt.raw_bind_parameter(idx, dt.format(DATETIME_FORMAT).to_string().as_str())
                }
                Value::Ip(IpAddr::V4(addr)) => stmt.raw_bind_parameter(idx, i64::from(u32::from(*addr))),
                Value::Ip(IpAddr::V6(addr)) => {
                    return Err(FarmError::ValueError(format!(
                        "cannot store IPv6 address {addr} in sqlite"
                    )));
                }
            }
            .map_err(|e| FarmError::DatabaseError(format!("Bind error: {e}")))?;
        }
        Ok(())
    }

    /// Converts a `rusqlite::Row` to our generic `Row`.
    ///
    /// Text that is not valid UTF-8 is an error rather than being replaced.
    fn convert_row(sqlite_row: &rusqlite::Row<'_>, column_names: &[String]) -> FarmResult<Row> {
        let values = (0..column_names.len())
            .map(|i| {
                let val_ref = sqlite_row
                    .get_ref(i)
                    .map_err(|e| FarmError::DatabaseError(format!("{e}")))?;
                Ok(match val_ref {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(v) => Value::Int(v),
                    ValueRef::Real(v) => Value::Float(v),
                    ValueRef::Text(b) => std::str::from_utf8(b)
                        .map(|text| Value::String(text.to_string()))
                        .map_err(|e| {
                            FarmError::DatabaseError(format!(
                                "column '{}' holds invalid UTF-8 text: {e}",
                                column_names[i]
                            ))
                        })?,
                    ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
                })
            })
            .collect::<FarmResult<Vec<Value>>>()?;

        Ok(Row::new(column_names.to_vec(), values))
    }

    /// Runs `f` against the connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, f: F) -> FarmResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&rusqlite::Connection) -> FarmResult<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn)
        })
        .await
        .map_err(|e| FarmError::DatabaseError(format!("Task join error: {e}")))?
    }

    /// Prepares, binds and executes one statement.
    fn run(conn: &rusqlite::Connection, sql: &str, params: &[Value]) -> FarmResult<usize> {
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| FarmError::DatabaseError(format!("{e}")))?;
        Self::bind_params(&mut stmt, params)?;
        stmt.raw_execute()
            .map_err(|e| FarmError::DatabaseError(format!("{e}")))
    }
}

#[async_trait::async_trait]
impl DatabaseBackend for SqliteBackend {
    fn vendor(&self) -> &str {
        "sqlite"
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> FarmResult<u64> {
        tracing::trace!(sql, "execute");
        let sql = sql.to_string();
        let params = params.to_vec();
        self.with_conn(move |conn| Self::run(conn, &sql, &params).map(|n| n as u64))
            .await
    }

    async fn query(&self, sql: &str, params: &[Value]) -> FarmResult<Vec<Row>> {
        tracing::trace!(sql, "query");
        let sql = sql.to_string();
        let params = params.to_vec();
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| FarmError::DatabaseError(format!("{e}")))?;

            let column_names: Vec<String> =
                stmt.column_names().into_iter().map(String::from).collect();

            Self::bind_params(&mut stmt, &params)?;

            let mut raw_rows = stmt.raw_query();
            let mut rows = Vec::new();
            while let Some(row) = raw_rows
                .next()
                .map_err(|e| FarmError::DatabaseError(format!("{e}")))?
            {
                rows.push(Self::convert_row(row, &column_names)?);
            }

            Ok(rows)
        })
        .await
    }

    async fn begin_transaction(&self) -> FarmResult<()> {
        self.execute("BEGIN", &[]).await.map(|_| ())
    }

    async fn commit(&self) -> FarmResult<()> {
        self.execute("COMMIT", &[]).await.map(|_| ())
    }

    async fn rollback(&self) -> FarmResult<()> {
        self.execute("ROLLBACK", &[]).await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl DbExecutor for SqliteBackend {
    async fn execute_sql(&self, sql: &str, params: &[Value]) -> FarmResult<u64> {
        self.execute(sql, params).await
    }

    async fn query(&self, sql: &str, params: &[Value]) -> FarmResult<Vec<Row>> {
        DatabaseBackend::query(self, sql, params).await
    }

    async fn query_one(&self, sql: &str, params: &[Value]) -> FarmResult<Row> {
        DatabaseBackend::query_one(self, sql, params).await
    }

    async fn insert_returning_id(&self, sql: &str, params: &[Value]) -> FarmResult<Value> {
        tracing::trace!(sql, "insert");
        let sql = sql.to_string();
        let params = params.to_vec();
        self.with_conn(move |conn| {
            Self::run(conn, &sql, &params)?;
            Ok(Value::Int(conn.last_insert_rowid()))
        })
        .await
    }

    async fn begin(&self) -> FarmResult<()> {
        self.begin_transaction().await
    }

    async fn commit(&self) -> FarmResult<()> {
        DatabaseBackend::commit(self).await
    }

    async fn rollback(&self) -> FarmResult<()> {
        DatabaseBackend::rollback(self).await
    }
}
