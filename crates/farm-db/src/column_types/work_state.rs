//! Work state column type.
//!
//! A [`WorkState`] is stored as its integer code. Application code can set a
//! work state as the enum, its lowercase name (`"running"`) or its code
//! (`104`); reading always yields the name.

use std::fmt;
use std::str::FromStr;

use farm_core::{FarmError, FarmResult};

use super::ColumnType;
use crate::fields::FieldType;
use crate::row::FromValue;
use crate::value::Value;

/// The state of a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkState {
    /// Held back by the user.
    Paused,
    /// Waiting on something else to finish.
    Blocked,
    /// Ready to run.
    Queued,
    /// Being handed to an agent.
    Assign,
    /// Running on an agent.
    Running,
    /// Finished successfully.
    Done,
    /// Finished with an error.
    Failed,
}

impl WorkState {
    /// Every state, in code order.
    pub const ALL: [Self; 7] = [
        Self::Paused,
        Self::Blocked,
        Self::Queued,
        Self::Assign,
        Self::Running,
        Self::Done,
        Self::Failed,
    ];

    /// Returns the integer code stored in the database.
    pub const fn code(self) -> i64 {
        match self {
            Self::Paused => 100,
            Self::Blocked => 101,
            Self::Queued => 102,
            Self::Assign => 103,
            Self::Running => 104,
            Self::Done => 105,
            Self::Failed => 106,
        }
    }

    /// Returns the lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paused => "paused",
            Self::Blocked => "blocked",
            Self::Queued => "queued",
            Self::Assign => "assign",
            Self::Running => "running",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Looks up a state by its integer code.
    pub fn from_code(code: i64) -> FarmResult<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.code() == code)
            .ok_or_else(|| FarmError::ValueError(format!("invalid work state code {code}")))
    }

    /// Returns `true` for the states work ends in.
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for WorkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkState {
    type Err = FarmError;

    fn from_str(s: &str) -> FarmResult<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| FarmError::ValueError(format!("invalid work state '{s}'")))
    }
}

impl TryFrom<&Value> for WorkState {
    type Error = FarmError;

    /// Accepts a code or a name. `NULL` is not a work state.
    fn try_from(value: &Value) -> FarmResult<Self> {
        match value {
            Value::Int(code) => Self::from_code(*code),
            Value::String(name) => name.parse(),
            Value::Null => Err(FarmError::ValueError("work state cannot be null".to_string())),
            other => Err(FarmError::TypeError(format!(
                "unexpected {} for a work state",
                other.kind()
            ))),
        }
    }
}

impl From<WorkState> for Value {
    fn from(state: WorkState) -> Self {
        Self::String(state.as_str().to_string())
    }
}

impl FromValue for WorkState {
    fn from_value(value: &Value) -> FarmResult<Self> {
        Self::try_from(value)
    }
}

/// Stores a [`WorkState`] as its integer code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkStateEnumType;

impl WorkStateEnumType {
    const NAME: &'static str = "WorkStateEnum";
}

impl ColumnType for WorkStateEnumType {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn storage(&self) -> FieldType {
        FieldType::IntegerField
    }

    fn to_storage(&self, value: &Value) -> FarmResult<Value> {
        WorkState::try_from(value).map(|state| Value::Int(state.code()))
    }

    fn from_storage(&self, value: &Value) -> FarmResult<Value> {
        match value {
            Value::Int(code) => WorkState::from_code(*code).map(Value::from),
            other => Err(FarmError::TypeError(format!(
                "stored {} cannot be read as {}",
                other.kind(),
                Self::NAME
            ))),
        }
    }
}
