//! Custom column types.
//!
//! A column type adapter sits between a model field and the database. On
//! write, [`ColumnType::bind`] turns the application value into the value
//! stored by the underlying ("storage") column type; on read,
//! [`ColumnType::result`] turns the stored value back into an application
//! value. `NULL` passes through both directions untouched.
//!
//! | Column type | Storage | Application value |
//! |---|---|---|
//! | [`Ipv4AddressType`] | `BIGINT` | `Value::Ip` (IPv4 only) |
//! | [`JsonDictType`] | `TEXT` | `Value::Json` holding an object |
//! | [`JsonListType`] | `TEXT` | `Value::Json` holding an array |
//! | [`WorkStateEnumType`] | `INTEGER` | `Value::String` holding a [`WorkState`] name |

pub mod ipv4;
pub mod json;
pub mod work_state;

use std::fmt;

use farm_core::FarmResult;

use crate::fields::FieldType;
use crate::value::Value;

pub use ipv4::Ipv4AddressType;
pub use json::{JsonDict, JsonDictType, JsonList, JsonListType, JsonSerializable, JsonShape};
pub use work_state::{WorkState, WorkStateEnumType};

/// Converts values between their application and storage representations.
///
/// # Examples
///
/// ```
/// use farm_db::column_types::{ColumnType, Ipv4AddressType};
/// use farm_db::value::Value;
///
/// let stored = Ipv4AddressType.bind(&Value::from("192.168.1.1")).unwrap();
/// assert_eq!(stored, Value::Int(3_232_235_777));
///
/// let loaded = Ipv4AddressType.result(&stored).unwrap();
/// assert_eq!(loaded.to_string(), "192.168.1.1");
/// ```
pub trait ColumnType: Send + Sync + fmt::Debug {
    /// The type name reported by schema introspection.
    fn name(&self) -> &'static str;

    /// The field type values are stored as.
    fn storage(&self) -> FieldType;

    /// Converts a non-null application value into its storage value.
    fn to_storage(&self, value: &Value) -> FarmResult<Value>;

    /// Converts a non-null storage value into its application value.
    fn from_storage(&self, value: &Value) -> FarmResult<Value>;

    /// Converts an application value for binding into a statement.
    fn bind(&self, value: &Value) -> FarmResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        self.to_storage(value)
    }

    /// Converts a value read from the database into an application value.
    fn result(&self, value: &Value) -> FarmResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        self.from_storage(value)
    }
}
