//! IPv4 address column type.
//!
//! Addresses are stored as their unsigned 32-bit integer form in a
//! big-integer column, so the full range `0..=4294967295` fits without
//! wrapping into negative numbers.

use std::net::{IpAddr, Ipv4Addr};

use farm_core::{FarmError, FarmResult};

use super::ColumnType;
use crate::fields::FieldType;
use crate::value::Value;

/// Stores an IPv4 address as an integer.
///
/// Binding accepts an integer, a dotted-quad string, or an address object.
/// Reading always yields an address object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ipv4AddressType;

impl Ipv4AddressType {
    /// The storage field type.
    pub const IMPL: FieldType = FieldType::BigIntegerField;

    /// The largest integer an IPv4 address can have.
    pub const MAX_INT: i64 = 4_294_967_295;

    const NAME: &'static str = "IPv4Address";

    /// Checks that `value` is within `0..=MAX_INT`.
    ///
    /// # Examples
    ///
    /// ```
    /// use farm_db::column_types::Ipv4AddressType;
    ///
    /// assert_eq!(Ipv4AddressType::check_integer(0).unwrap(), 0);
    /// assert!(Ipv4AddressType::check_integer(-1).is_err());
    /// assert!(Ipv4AddressType::check_integer(Ipv4AddressType::MAX_INT + 1).is_err());
    /// ```
    pub fn check_integer(value: i64) -> FarmResult<u32> {
        u32::try_from(value).map_err(|_| {
            FarmError::ValueError(format!("invalid integer '{value}' for {}", Self::NAME))
        })
    }

    /// Parses a dotted-quad string into an address.
    ///
    /// The string must be the address alone; surrounding whitespace is
    /// rejected.
    pub fn parse(value: &str) -> FarmResult<Ipv4Addr> {
        value.parse::<Ipv4Addr>().map_err(|e| {
            FarmError::ValueError(format!(
                "invalid address '{value}' for {}: {e}",
                Self::NAME
            ))
        })
    }

    /// Converts an application value into the integer form of its address.
    pub fn to_integer(value: &Value) -> FarmResult<u32> {
        match value {
            Value::Int(i) => Self::check_integer(*i),
            Value::String(s) => Ok(u32::from(Self::parse(s)?)),
            Value::Ip(IpAddr::V4(addr)) => Ok(u32::from(*addr)),
            Value::Ip(IpAddr::V6(addr)) => Err(FarmError::ValueError(format!(
                "IPv6 address '{addr}' is not valid for {}",
                Self::NAME
            ))),
            other => Err(FarmError::TypeError(format!(
                "unexpected {} for `{}`",
                other.kind(),
                Self::NAME
            ))),
        }
    }
}

impl ColumnType for Ipv4AddressType {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn storage(&self) -> FieldType {
        Self::IMPL
    }

    fn to_storage(&self, value: &Value) -> FarmResult<Value> {
        let int = Self::to_integer(value)?;
        tracing::trace!(input = %value, stored = int, "bound IPv4 address");
        Ok(Value::Int(i64::from(int)))
    }

    fn from_storage(&self, value: &Value) -> FarmResult<Value> {
        match value {
            Value::Int(i) => {
                let int = Self::check_integer(*i)?;
                Ok(Value::Ip(IpAddr::V4(Ipv4Addr::from(int))))
            }
            other => Err(FarmError::TypeError(format!(
                "stored {} cannot be read as {}",
                other.kind(),
                Self::NAME
            ))),
        }
    }
}
