//! Database executor trait and model persistence.
//!
//! This module defines the [`DbExecutor`] trait, the minimal async interface
//! the model layer needs from a backend, and the free functions that persist
//! and load models through it.
//!
//! Column type adapters run here. [`commit_model`] binds every field through
//! its column type before any SQL is issued, so a rejected value surfaces as
//! a [`FarmError::StatementError`] and nothing is written. [`fetch_model`]
//! converts stored values back before handing the row to
//! [`Model::from_row`].

use farm_core::logging::commit_span;
use farm_core::{FarmError, FarmResult};
use tracing::Instrument;

use crate::compiler::SqlCompiler;
use crate::model::Model;
use crate::row::Row;
use crate::value::Value;

/// Minimal async database executor trait.
///
/// This is the bridge between the model layer (`farm-db`) and the concrete
/// database backends (`farm-db-backends`), which implement it.
#[async_trait::async_trait]
pub trait DbExecutor: Send + Sync {
    /// Runs a SQL statement that does not return rows.
    /// Returns the number of rows affected.
    async fn execute_sql(&self, sql: &str, params: &[Value]) -> FarmResult<u64>;

    /// Runs a SQL query and returns all result rows.
    async fn query(&self, sql: &str, params: &[Value]) -> FarmResult<Vec<Row>>;

    /// Runs a SQL query and returns exactly one row.
    /// Returns `DoesNotExist` if no rows, `MultipleObjectsReturned` if more than one.
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

    /// Executes an INSERT and returns the last inserted row ID.
    async fn insert_returning_id(&self, sql: &str, params: &[Value]) -> FarmResult<Value> {
        self.execute_sql(sql, params).await?;
        let row = self.query_one("SELECT last_insert_rowid() AS id", &[]).await?;
        row.get::<Value>("id")
    }

    /// Begins a transaction.
    async fn begin(&self) -> FarmResult<()> {
        self.execute_sql("BEGIN", &[]).await.map(|_| ())
    }

    /// Commits the current transaction.
    async fn commit(&self) -> FarmResult<()> {
        self.execute_sql("COMMIT", &[]).await.map(|_| ())
    }

    /// Rolls back the current transaction.
    async fn rollback(&self) -> FarmResult<()> {
        self.execute_sql("ROLLBACK", &[]).await.map(|_| ())
    }
}

/// Runs every field value of `M` through its column type.
///
/// Returns `(column, storage value)` pairs. Fields without a column type are
/// passed through unchanged.
///
/// # Errors
///
/// Returns a [`FarmError::StatementError`] naming the table and column of
/// the first value a column type rejects.
pub fn bind_field_values<M: Model>(
    values: Vec<(&'static str, Value)>,
) -> FarmResult<Vec<(&'static str, Value)>> {
    let meta = M::meta();
    values
        .into_iter()
        .map(|(name, value)| {
            let Some(field) = meta.field(name) else {
                return Ok((name, value));
            };
            let column = field.column.as_str();
            match field.adapter() {
                Some(adapter) => adapter
                    .bind(&value)
                    .map(|stored| (column, stored))
                    .map_err(|e| FarmError::statement(M::table_name(), column, e)),
                None => Ok((column, value)),
            }
        })
        .collect()
}

/// Converts the custom column values of a result row to application values.
///
/// # Errors
///
/// Returns the conversion error of the first stored value a column type
/// cannot read.
pub fn convert_row<M: Model>(mut row: Row) -> FarmResult<Row> {
    for field in &M::meta().fields {
        let Some(adapter) = field.adapter() else {
            continue;
        };
        let Some(stored) = row.get_value(&field.column) else {
            continue;
        };
        let converted = adapter.result(stored)?;
        row.replace(&field.column, converted);
    }
    Ok(row)
}

/// Creates the table for `M` if it does not exist.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub async fn create_table<M: Model>(db: &dyn DbExecutor) -> FarmResult<()> {
    let sql = SqlCompiler::new().compile_create_table(M::table_name(), &M::meta().fields);
    db.execute_sql(&sql, &[]).await?;
    tracing::debug!(table = M::table_name(), "created table");
    Ok(())
}

/// Fills unset values of a new model with their field defaults.
///
/// A `NULL` value is replaced by the default declared on its field, if any.
/// Other values are left alone.
pub fn apply_defaults<M: Model>(values: Vec<(&'static str, Value)>) -> Vec<(&'static str, Value)> {
    let meta = M::meta();
    values
        .into_iter()
        .map(|(name, value)| {
            if !value.is_null() {
                return (name, value);
            }
            match meta.field(name).and_then(|f| f.default.clone()) {
                Some(default) => (name, default),
                None => (name, value),
            }
        })
        .collect()
}

/// Persists a model instance and commits.
///
/// If the primary key is set, performs an UPDATE of all other fields;
/// otherwise fills unset fields with their defaults, performs an INSERT and
/// sets the primary key from the new row. Every value is bound through its
/// column type first, and the statement runs inside a transaction that is
/// rolled back if the statement or the COMMIT fails.
///
/// # Errors
///
/// Returns [`FarmError::StatementError`] if a column type rejects a value,
/// or the database error if the statement or the COMMIT fails. A failed
/// rollback is logged and does not replace that error.
pub async fn commit_model<M: Model>(model: &mut M, db: &dyn DbExecutor) -> FarmResult<()> {
    let span = commit_span(M::table_name());
    async {
        let pk = model.pk();
        let mut values = model.non_pk_field_values();
        if pk.is_none() {
            values = apply_defaults::<M>(values);
        }
        let fields = bind_field_values::<M>(values).inspect_err(|e| {
            tracing::debug!(error = %e, "rejected value before commit");
        })?;

        db.begin().await?;
        let written = match write_row::<M>(pk, &fields, db).await {
            Ok(written) => written,
            Err(e) => return Err(rollback(db, e).await),
        };
        if let Err(e) = db.commit().await {
            return Err(rollback(db, e).await);
        }
        if let Some(pk) = written {
            model.set_pk(pk);
        }
        tracing::debug!("committed");
        Ok(())
    }
    .instrument(span)
    .await
}

/// Rolls back the open transaction after `error` and hands `error` back.
async fn rollback(db: &dyn DbExecutor, error: FarmError) -> FarmError {
    tracing::debug!(error = %error, "rolling back");
    if let Err(rb) = db.rollback().await {
        tracing::warn!(error = %rb, "rollback failed");
    }
    error
}

/// Issues the INSERT or UPDATE for one model. Returns the new primary key
/// for inserts.
async fn write_row<M: Model>(
    pk: Option<Value>,
    fields: &[(&'static str, Value)],
    db: &dyn DbExecutor,
) -> FarmResult<Option<Value>> {
    let compiler = SqlCompiler::new();
    if let Some(pk) = pk {
        if fields.is_empty() {
            return Ok(None);
        }
        let (sql, params) =
            compiler.compile_update(M::table_name(), fields, M::pk_column(), &pk);
        db.execute_sql(&sql, &params).await?;
        Ok(None)
    } else {
        let (sql, params) = compiler.compile_insert(M::table_name(), fields);
        db.insert_returning_id(&sql, &params).await.map(Some)
    }
}

/// Loads a model instance by primary key.
///
/// # Errors
///
/// Returns [`FarmError::DoesNotExist`] if no row has that key, or the
/// conversion error if a stored value cannot be read by its column type.
pub async fn fetch_model<M: Model>(pk: impl Into<Value>, db: &dyn DbExecutor) -> FarmResult<M> {
    let meta = M::meta();
    let (sql, params) = SqlCompiler::new().compile_select_by_pk(
        M::table_name(),
        &meta.columns(),
        M::pk_column(),
        &pk.into(),
    );
    let row = db.query_one(&sql, &params).await?;
    M::from_row(&convert_row::<M>(row)?)
}
