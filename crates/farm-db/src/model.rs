//! Model trait and metadata.
//!
//! The [`Model`] trait is implemented by every struct that maps to a table.
//! It exposes the table metadata, the current field values, and
//! construction from a result row. [`ModelMeta`] captures the table name and
//! field definitions.
//!
//! [`UtilityMixins`] adds `to_dict` / `to_schema` helpers to any model that
//! opts in with an empty `impl`.

use std::collections::BTreeMap;

use farm_core::FarmError;

use crate::fields::FieldDef;
use crate::row::Row;
use crate::value::Value;

/// The core trait for all models.
///
/// # Examples
///
/// ```
/// use std::net::Ipv4Addr;
/// use std::sync::LazyLock;
/// use farm_db::model::{Model, ModelMeta};
/// use farm_db::fields::{FieldDef, FieldType};
/// use farm_db::row::Row;
/// use farm_db::value::Value;
/// use farm_core::FarmError;
///
/// struct Agent {
///     id: Option<i64>,
///     address: Value,
/// }
///
/// impl Model for Agent {
///     fn meta() -> &'static ModelMeta {
///         static META: LazyLock<ModelMeta> = LazyLock::new(|| {
///             ModelMeta::new("agent", "farm_agent", vec![
///                 FieldDef::new("id", FieldType::AutoField).primary_key(),
///                 FieldDef::new("address", FieldType::Ipv4Address),
///             ])
///         });
///         &META
///     }
///
///     fn pk(&self) -> Option<Value> { self.id.map(Value::Int) }
///     fn set_pk(&mut self, value: Value) { self.id = value.as_int(); }
///     fn field_values(&self) -> Vec<(&'static str, Value)> {
///         vec![("id", self.pk().into()), ("address", self.address.clone())]
///     }
///     fn from_row(row: &Row) -> Result<Self, FarmError> {
///         Ok(Agent { id: row.get("id")?, address: row.get("address")? })
///     }
/// }
///
/// assert_eq!(Agent::table_name(), "farm_agent");
/// ```
pub trait Model: Send + Sync + 'static {
    /// Returns the static metadata for this model type.
    fn meta() -> &'static ModelMeta;

    /// Returns the database table name.
    fn table_name() -> &'static str {
        &Self::meta().db_table
    }

    /// Returns the primary key value, or `None` if unsaved.
    fn pk(&self) -> Option<Value>;

    /// Sets the primary key value on this instance (used after INSERT).
    fn set_pk(&mut self, value: Value);

    /// Returns the name of the primary key field (e.g., "id").
    fn pk_field_name() -> &'static str {
        Self::meta()
            .fields
            .iter()
            .find(|f| f.primary_key)
            .map_or("id", |f| f.name)
    }

    /// Returns the database column of the primary key field.
    ///
    /// Differs from [`pk_field_name`](Model::pk_field_name) when the key
    /// field is declared with [`FieldDef::column`].
    fn pk_column() -> &'static str {
        Self::meta()
            .fields
            .iter()
            .find(|f| f.primary_key)
            .map_or("id", |f| f.column.as_str())
    }

    /// Returns all field name-value pairs for this instance.
    fn field_values(&self) -> Vec<(&'static str, Value)>;

    /// Returns field name-value pairs excluding the primary key.
    /// Used for INSERT operations where the PK is auto-generated.
    fn non_pk_field_values(&self) -> Vec<(&'static str, Value)> {
        let pk_name = Self::pk_field_name();
        self.field_values()
            .into_iter()
            .filter(|(name, _)| *name != pk_name)
            .collect()
    }

    /// Constructs a model instance from a database row.
    ///
    /// Custom column values in `row` have already been converted to their
    /// application form.
    fn from_row(row: &Row) -> Result<Self, FarmError>
    where
        Self: Sized;
}

/// Metadata about a model: its table and fields.
#[derive(Debug)]
pub struct ModelMeta {
    /// The model name in lowercase (e.g., "jsondict").
    pub model_name: &'static str,
    /// The database table name.
    pub db_table: String,
    /// Field definitions for this model.
    pub fields: Vec<FieldDef>,
}

impl ModelMeta {
    /// Creates metadata for a model.
    pub fn new(model_name: &'static str, db_table: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            model_name,
            db_table: db_table.into(),
            fields,
        }
    }

    /// Looks up a field by its attribute name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the column names of all fields, in declaration order.
    pub fn columns(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.column.as_str()).collect()
    }
}

/// Dictionary and schema helpers for models.
///
/// Opt in with `impl UtilityMixins for MyModel {}`; override
/// [`serialize_column`](UtilityMixins::serialize_column) to customize how
/// values appear in [`to_dict`](UtilityMixins::to_dict).
pub trait UtilityMixins: Model {
    /// Converts one field value for inclusion in [`to_dict`](UtilityMixins::to_dict).
    fn serialize_column(&self, value: Value) -> Value {
        value
    }

    /// Returns field name -> current value for every field.
    fn to_dict(&self) -> BTreeMap<String, Value> {
        self.field_values()
            .into_iter()
            .map(|(name, value)| (name.to_string(), self.serialize_column(value)))
            .collect()
    }

    /// Returns field name -> column type name for every field.
    ///
    /// Custom column types report their own name (e.g. `IPv4Address`).
    fn to_schema() -> BTreeMap<String, String> {
        Self::meta()
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.schema_type()))
            .collect()
    }
}
