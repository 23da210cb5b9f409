//! Result rows.
//!
//! A [`Row`] is what a backend hands back for each result row: column names
//! plus [`Value`]s. Typed access goes through the [`FromValue`] trait.

use std::net::{IpAddr, Ipv4Addr};

use farm_core::FarmError;

use crate::value::{Value, DATETIME_FORMAT};

/// A generic database row for passing data between backends and models.
///
/// `Row` holds a list of column names and their corresponding values. It
/// provides typed access via the [`get`](Row::get) method.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row from column names and values.
    ///
    /// # Panics
    ///
    /// Panics if the number of columns does not match the number of values.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        assert_eq!(
            columns.len(),
            values.len(),
            "Row column count must match value count"
        );
        Self { columns, values }
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Gets a typed value by column name.
    ///
    /// # Errors
    ///
    /// Returns an error if the column does not exist or the value cannot be
    /// converted to the requested type.
    pub fn get<T: FromValue>(&self, column: &str) -> Result<T, FarmError> {
        let idx = self.position(column).ok_or_else(|| {
            FarmError::DatabaseError(format!("Column '{column}' not found in row"))
        })?;
        T::from_value(&self.values[idx])
    }

    /// Returns a reference to the raw Value at the given column name.
    pub fn get_value(&self, column: &str) -> Option<&Value> {
        self.position(column).map(|idx| &self.values[idx])
    }

    /// Replaces the value at the given column name, returning the old value.
    pub fn replace(&mut self, column: &str, value: Value) -> Option<Value> {
        let idx = self.position(column)?;
        Some(std::mem::replace(&mut self.values[idx], value))
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

/// Trait for converting a [`Value`] to a concrete Rust type.
pub trait FromValue: Sized {
    /// Attempts to convert a value reference to this type.
    fn from_value(value: &Value) -> Result<Self, FarmError>;
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, FarmError> {
        match value {
            Value::Int(i) => Ok(*i),
            _ => Err(FarmError::DatabaseError(format!(
                "Expected Int, got {value:?}"
            ))),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, FarmError> {
        match value {
            Value::Int(i) => i32::try_from(*i).map_err(|e| {
                FarmError::DatabaseError(format!("Int value out of i32 range: {e}"))
            }),
            _ => Err(FarmError::DatabaseError(format!(
                "Expected Int, got {value:?}"
            ))),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, FarmError> {
        match value {
            Value::Float(f) => Ok(*f),
            _ => Err(FarmError::DatabaseError(format!(
                "Expected Float, got {value:?}"
            ))),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, FarmError> {
        match value {
            Value::Bool(b) => Ok(*b),
            // SQLite has no boolean storage class.
            Value::Int(i) => Ok(*i != 0),
            _ => Err(FarmError::DatabaseError(format!(
                "Expected Bool, got {value:?}"
            ))),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, FarmError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(FarmError::DatabaseError(format!(
                "Expected String, got {value:?}"
            ))),
        }
    }
}

impl FromValue for IpAddr {
    fn from_value(value: &Value) -> Result<Self, FarmError> {
        match value {
            Value::Ip(ip) => Ok(*ip),
            _ => Err(FarmError::DatabaseError(format!(
                "Expected Ip, got {value:?}"
            ))),
        }
    }
}

impl FromValue for Ipv4Addr {
    fn from_value(value: &Value) -> Result<Self, FarmError> {
        match value {
            Value::Ip(IpAddr::V4(addr)) => Ok(*addr),
            _ => Err(FarmError::DatabaseError(format!(
                "Expected IPv4 address, got {value:?}"
            ))),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: &Value) -> Result<Self, FarmError> {
        match value {
            Value::Json(j) => Ok(j.clone()),
            _ => Err(FarmError::DatabaseError(format!(
                "Expected Json, got {value:?}"
            ))),
        }
    }
}

impl FromValue for chrono::NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self, FarmError> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            // SQLite keeps datetimes as text.
            Value::String(s) => chrono::NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
                .map_err(|e| FarmError::DatabaseError(format!("Invalid datetime '{s}': {e}"))),
            _ => Err(FarmError::DatabaseError(format!(
                "Expected DateTime, got {value:?}"
            ))),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, FarmError> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, FarmError> {
        match value {
            Value::Null => Ok(None),
            _ => T::from_value(value).map(Some),
        }
    }
}
