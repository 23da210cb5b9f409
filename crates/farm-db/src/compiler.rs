//! SQL statement compiler.
//!
//! [`SqlCompiler`] produces the handful of parameterized statements the model
//! layer needs: table creation, insert, update by primary key, and select by
//! primary key. Placeholders use the SQLite `?` style.

use crate::fields::FieldDef;
use crate::value::Value;

/// Compiles model operations into parameterized SQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlCompiler;

impl SqlCompiler {
    /// Creates a new compiler.
    pub const fn new() -> Self {
        Self
    }

    /// Compiles a `CREATE TABLE IF NOT EXISTS` statement.
    pub fn compile_create_table(&self, table: &str, fields: &[FieldDef]) -> String {
        let columns: Vec<String> = fields.iter().map(FieldDef::column_definition).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS \"{table}\" ({})",
            columns.join(", ")
        )
    }

    /// Compiles an INSERT statement.
    pub fn compile_insert(&self, table: &str, fields: &[(&str, Value)]) -> (String, Vec<Value>) {
        if fields.is_empty() {
            return (format!("INSERT INTO \"{table}\" DEFAULT VALUES"), Vec::new());
        }

        let columns: Vec<String> = fields.iter().map(|(name, _)| format!("\"{name}\"")).collect();
        let placeholders = vec!["?"; fields.len()];
        let params = fields.iter().map(|(_, val)| val.clone()).collect();

        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        );

        (sql, params)
    }

    /// Compiles an UPDATE statement filtered by primary key.
    pub fn compile_update(
        &self,
        table: &str,
        fields: &[(&str, Value)],
        pk_column: &str,
        pk: &Value,
    ) -> (String, Vec<Value>) {
        let mut params: Vec<Value> = Vec::with_capacity(fields.len() + 1);
        let set_parts: Vec<String> = fields
            .iter()
            .map(|(name, val)| {
                params.push(val.clone());
                format!("\"{name}\" = ?")
            })
            .collect();
        params.push(pk.clone());

        let sql = format!(
            "UPDATE \"{}\" SET {} WHERE \"{}\" = ?",
            table,
            set_parts.join(", "),
            pk_column
        );

        (sql, params)
    }

    /// Compiles a SELECT of the given columns filtered by primary key.
    pub fn compile_select_by_pk(
        &self,
        table: &str,
        columns: &[&str],
        pk_column: &str,
        pk: &Value,
    ) -> (String, Vec<Value>) {
        let select = if columns.is_empty() {
            "*".to_string()
        } else {
            columns
                .iter()
                .map(|c| format!("\"{c}\""))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let sql = format!("SELECT {select} FROM \"{table}\" WHERE \"{pk_column}\" = ?");
        (sql, vec![pk.clone()])
    }
}
