//! JSON column types.
//!
//! [`JsonDictType`] and [`JsonListType`] store a JSON document as text. Each
//! accepts exactly one document shape; binding a document of the other shape
//! fails with a type error, which the executor surfaces as a statement error
//! at commit time.
//!
//! [`JsonDict`] and [`JsonList`] are typed wrappers for model fields. Any
//! `serde`-serializable mapping (`serde_json::Map`, `BTreeMap`, `HashMap`,
//! derived structs) converts into a `JsonDict`; any serializable sequence
//! (`Vec`, `VecDeque`, arrays, tuples) converts into a `JsonList`.

use std::ops::{Deref, DerefMut};

use farm_core::{FarmError, FarmResult};
use serde::{Deserialize, Serialize};

use super::ColumnType;
use crate::fields::FieldType;
use crate::row::FromValue;
use crate::value::Value;

/// The shape of JSON document a column accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    /// A JSON object (`{...}`).
    Object,
    /// A JSON array (`[...]`).
    Array,
}

impl JsonShape {
    /// Returns `true` if `value` has this shape.
    pub const fn matches(self, value: &serde_json::Value) -> bool {
        matches!(
            (self, value),
            (Self::Object, serde_json::Value::Object(_)) | (Self::Array, serde_json::Value::Array(_))
        )
    }

    /// Returns the shape's name, for error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

/// A column type that stores one shape of JSON document as text.
///
/// Implementors declare their name and accepted shape; serialization and
/// shape checking are shared.
pub trait JsonSerializable {
    /// The type name reported by schema introspection.
    const NAME: &'static str;

    /// The document shape this column accepts.
    const SHAPE: JsonShape;

    /// Serializes a document to its stored text.
    fn dumps(value: &serde_json::Value) -> FarmResult<String> {
        serde_json::to_string(value).map_err(|e| {
            FarmError::SerializationError(format!("failed to encode {}: {e}", Self::NAME))
        })
    }

    /// Parses stored text back into a document.
    fn loads(text: &str) -> FarmResult<serde_json::Value> {
        serde_json::from_str(text).map_err(|e| {
            FarmError::SerializationError(format!("failed to decode {}: {e}", Self::NAME))
        })
    }

    /// Converts an application value into stored text.
    fn serialize(value: &Value) -> FarmResult<Value> {
        match value {
            Value::Json(doc) if Self::SHAPE.matches(doc) => {
                let text = Self::dumps(doc)?;
                tracing::trace!(column_type = Self::NAME, bytes = text.len(), "bound JSON document");
                Ok(Value::String(text))
            }
            other => Err(FarmError::TypeError(format!(
                "unexpected {} for `{}`, expected json {}",
                other.kind(),
                Self::NAME,
                Self::SHAPE.as_str()
            ))),
        }
    }

    /// Converts stored text into an application value.
    fn deserialize(value: &Value) -> FarmResult<Value> {
        let Value::String(text) = value else {
            return Err(FarmError::TypeError(format!(
                "stored {} cannot be read as {}",
                value.kind(),
                Self::NAME
            )));
        };
        let doc = Self::loads(text)?;
        if !Self::SHAPE.matches(&doc) {
            return Err(FarmError::TypeError(format!(
                "stored {} is not a json {}",
                Self::NAME,
                Self::SHAPE.as_str()
            )));
        }
        Ok(Value::Json(doc))
    }
}

/// Stores a JSON object as text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonDictType;

impl JsonSerializable for JsonDictType {
    const NAME: &'static str = "JSONDict";
    const SHAPE: JsonShape = JsonShape::Object;
}

impl ColumnType for JsonDictType {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn storage(&self) -> FieldType {
        FieldType::TextField
    }

    fn to_storage(&self, value: &Value) -> FarmResult<Value> {
        Self::serialize(value)
    }

    fn from_storage(&self, value: &Value) -> FarmResult<Value> {
        Self::deserialize(value)
    }
}

/// Stores a JSON array as text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonListType;

impl JsonSerializable for JsonListType {
    const NAME: &'static str = "JSONList";
    const SHAPE: JsonShape = JsonShape::Array;
}

impl ColumnType for JsonListType {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn storage(&self) -> FieldType {
        FieldType::TextField
    }

    fn to_storage(&self, value: &Value) -> FarmResult<Value> {
        Self::serialize(value)
    }

    fn from_storage(&self, value: &Value) -> FarmResult<Value> {
        Self::deserialize(value)
    }
}

// ── Typed wrappers ─────────────────────────────────────────────────────

/// A JSON object held by a [`JsonDictType`] field.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use farm_db::column_types::JsonDict;
///
/// let mut source = BTreeMap::new();
/// source.insert("int", -1024);
/// let dict = JsonDict::from_serializable(&source).unwrap();
/// assert_eq!(dict["int"], -1024);
///
/// assert!(JsonDict::from_serializable(&vec![1, 2]).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonDict(serde_json::Map<String, serde_json::Value>);

impl JsonDict {
    /// Creates an empty dict.
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts any serializable mapping into a dict.
    ///
    /// Values that do not serialize to a JSON object are a type error.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> FarmResult<Self> {
        let doc = serde_json::to_value(value)
            .map_err(|e| FarmError::SerializationError(e.to_string()))?;
        Self::try_from(doc)
    }

    /// Returns the underlying map.
    pub fn into_inner(self) -> serde_json::Map<String, serde_json::Value> {
        self.0
    }
}

impl Deref for JsonDict {
    type Target = serde_json::Map<String, serde_json::Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for JsonDict {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for JsonDict {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, serde_json::Value)> for JsonDict {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl TryFrom<serde_json::Value> for JsonDict {
    type Error = FarmError;

    fn try_from(doc: serde_json::Value) -> FarmResult<Self> {
        match doc {
            serde_json::Value::Object(map) => Ok(Self(map)),
            other => Err(FarmError::TypeError(format!(
                "{} is not a json object",
                Value::Json(other).kind()
            ))),
        }
    }
}

impl From<JsonDict> for serde_json::Value {
    fn from(dict: JsonDict) -> Self {
        Self::Object(dict.0)
    }
}

impl From<JsonDict> for Value {
    fn from(dict: JsonDict) -> Self {
        Self::Json(dict.into())
    }
}

impl FromValue for JsonDict {
    fn from_value(value: &Value) -> FarmResult<Self> {
        match value {
            Value::Json(serde_json::Value::Object(map)) => Ok(Self(map.clone())),
            _ => Err(FarmError::DatabaseError(format!(
                "Expected JSON object, got {value:?}"
            ))),
        }
    }
}

/// A JSON array held by a [`JsonListType`] field.
///
/// # Examples
///
/// ```
/// use farm_db::column_types::JsonList;
///
/// let list = JsonList::from_serializable(&("a", -1024, true, None::<i32>)).unwrap();
/// assert_eq!(list.len(), 4);
/// assert!(list[3].is_null());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonList(Vec<serde_json::Value>);

impl JsonList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts any serializable sequence into a list.
    ///
    /// Values that do not serialize to a JSON array are a type error.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> FarmResult<Self> {
        let doc = serde_json::to_value(value)
            .map_err(|e| FarmError::SerializationError(e.to_string()))?;
        Self::try_from(doc)
    }

    /// Returns the underlying vector.
    pub fn into_inner(self) -> Vec<serde_json::Value> {
        self.0
    }
}

impl Deref for JsonList {
    type Target = Vec<serde_json::Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for JsonList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<serde_json::Value>> for JsonList {
    fn from(items: Vec<serde_json::Value>) -> Self {
        Self(items)
    }
}

impl FromIterator<serde_json::Value> for JsonList {
    fn from_iter<I: IntoIterator<Item = serde_json::Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl TryFrom<serde_json::Value> for JsonList {
    type Error = FarmError;

    fn try_from(doc: serde_json::Value) -> FarmResult<Self> {
        match doc {
            serde_json::Value::Array(items) => Ok(Self(items)),
            other => Err(FarmError::TypeError(format!(
                "{} is not a json array",
                Value::Json(other).kind()
            ))),
        }
    }
}

impl From<JsonList> for serde_json::Value {
    fn from(list: JsonList) -> Self {
        Self::Array(list.0)
    }
}

impl From<JsonList> for Value {
    fn from(list: JsonList) -> Self {
        Self::Json(list.into())
    }
}

impl FromValue for JsonList {
    fn from_value(value: &Value) -> FarmResult<Self> {
        match value {
            Value::Json(serde_json::Value::Array(items)) => Ok(Self(items.clone())),
            _ => Err(FarmError::DatabaseError(format!(
                "Expected JSON array, got {value:?}"
            ))),
        }
    }
}
