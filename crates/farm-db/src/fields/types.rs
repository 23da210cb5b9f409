//! Field type definitions.
//!
//! Each [`FieldType`] variant corresponds to a column type a model field can
//! use, and [`FieldDef`] captures all metadata about a single model field.
//! The custom column types ([`FieldType::Ipv4Address`],
//! [`FieldType::JsonDict`], [`FieldType::JsonList`],
//! [`FieldType::WorkStateEnum`]) carry a [`ColumnType`] adapter that
//! converts values on their way to and from storage.

use crate::column_types::{
    ColumnType, Ipv4AddressType, JsonDictType, JsonListType, WorkStateEnumType,
};
use crate::value::Value;

/// The type of a model field, determining its SQL column type and behavior.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum FieldType {
    /// Auto-incrementing integer primary key.
    AutoField,
    /// Variable-length string with a max length.
    CharField,
    /// Unlimited-length text.
    TextField,
    /// 32-bit signed integer.
    IntegerField,
    /// 64-bit signed integer.
    BigIntegerField,
    /// 64-bit floating-point number.
    FloatField,
    /// Boolean (true/false).
    BooleanField,
    /// Raw binary data.
    BinaryField,
    /// Date and time without a timezone, stored as ISO 8601 text.
    DateTimeField,
    /// IPv4 address stored as an unsigned 32-bit value in a big-integer column.
    Ipv4Address,
    /// JSON object stored as text.
    JsonDict,
    /// JSON array stored as text.
    JsonList,
    /// Work state stored as its integer code.
    WorkStateEnum,
}

impl FieldType {
    /// Returns the column type adapter for custom column types.
    ///
    /// Built-in column types store values as they are and return `None`.
    pub fn adapter(&self) -> Option<&'static dyn ColumnType> {
        match self {
            Self::Ipv4Address => Some(&Ipv4AddressType),
            Self::JsonDict => Some(&JsonDictType),
            Self::JsonList => Some(&JsonListType),
            Self::WorkStateEnum => Some(&WorkStateEnumType),
            _ => None,
        }
    }

    /// Returns the SQLite column type used in `CREATE TABLE`.
    ///
    /// Custom column types are created with the column type of their
    /// storage field.
    pub fn sqlite_column_type(&self) -> String {
        match self {
            Self::AutoField => "INTEGER PRIMARY KEY AUTOINCREMENT".to_string(),
            Self::CharField => "VARCHAR".to_string(),
            Self::TextField => "TEXT".to_string(),
            Self::IntegerField => "INTEGER".to_string(),
            Self::BigIntegerField => "BIGINT".to_string(),
            Self::FloatField => "REAL".to_string(),
            Self::BooleanField => "BOOLEAN".to_string(),
            Self::BinaryField => "BLOB".to_string(),
            Self::DateTimeField => "DATETIME".to_string(),
            Self::Ipv4Address | Self::JsonDict | Self::JsonList | Self::WorkStateEnum => self
                .adapter()
                .map(|adapter| adapter.storage().sqlite_column_type())
                .unwrap_or_default(),
        }
    }
}

/// Complete definition of a model field, including metadata and constraints.
///
/// Typically constructed when implementing [`Model::meta`](crate::model::Model::meta).
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// The Rust attribute name of this field.
    pub name: &'static str,
    /// The database column name (may differ from `name`).
    pub column: String,
    /// The type of this field.
    pub field_type: FieldType,
    /// Whether this field is the primary key.
    pub primary_key: bool,
    /// Whether NULL is allowed in the database.
    pub null: bool,
    /// Default value for new instances.
    pub default: Option<Value>,
    /// Whether a UNIQUE constraint is applied.
    pub unique: bool,
    /// Maximum character length (for CharField).
    pub max_length: Option<usize>,
}

impl FieldDef {
    /// Creates a new `FieldDef` with sensible defaults.
    ///
    /// Only the field name and type are required. Fields are nullable by
    /// default, matching a plain column declaration.
    pub fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            column: name.to_string(),
            field_type,
            primary_key: false,
            null: true,
            default: None,
            unique: false,
            max_length: None,
        }
    }

    /// Sets the database column name.
    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Marks this field as the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.null = false;
        self
    }

    /// Disallows NULL values in the database.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.null = false;
        self
    }

    /// Sets the maximum character length.
    #[must_use]
    pub const fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Marks this field as having a UNIQUE constraint.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the value stored on insert when the model leaves this field unset.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Returns the column type adapter for this field, if it has one.
    pub fn adapter(&self) -> Option<&'static dyn ColumnType> {
        self.field_type.adapter()
    }

    /// Returns the type name reported by schema introspection.
    ///
    /// Custom column types report their own name (e.g. `IPv4Address`),
    /// sized strings report `VARCHAR(n)`.
    pub fn schema_type(&self) -> String {
        if let Some(adapter) = self.adapter() {
            return adapter.name().to_string();
        }
        match (&self.field_type, self.max_length) {
            (FieldType::CharField, Some(len)) => format!("VARCHAR({len})"),
            (FieldType::AutoField, _) => "INTEGER".to_string(),
            (field_type, _) => field_type.sqlite_column_type(),
        }
    }

    /// Returns the column definition used in `CREATE TABLE`.
    pub fn column_definition(&self) -> String {
        let mut sql = format!("\"{}\" ", self.column);
        match (&self.field_type, self.max_length) {
            (FieldType::CharField, Some(len)) => sql.push_str(&format!("VARCHAR({len})")),
            (field_type, _) => sql.push_str(&field_type.sqlite_column_type()),
        }
        if self.primary_key && self.field_type != FieldType::AutoField {
            sql.push_str(" PRIMARY KEY");
        }
        if !self.null && !self.primary_key {
            sql.push_str(" NOT NULL");
        }
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        sql
    }
}
