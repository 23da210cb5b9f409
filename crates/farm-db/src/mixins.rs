//! Validation and work state behavior for models.
//!
//! These traits give a model setters that enforce the limits of the columns
//! they write. A model keeps its own fields and hands out mutable access to
//! them; the default methods do the checking.
//!
//! - [`ValidatePriorityMixin`] keeps `priority` within
//!   [`MIN_PRIORITY`](ValidatePriorityMixin::MIN_PRIORITY)..=[`MAX_PRIORITY`](ValidatePriorityMixin::MAX_PRIORITY)
//! - [`ValidateWorkStateMixin`] accepts only known work states and at least
//!   one attempt
//! - [`WorkStateChangedMixin`] counts attempts and stamps start and finish
//!   times as the state moves through `running`, `done` and `failed`

use chrono::NaiveDateTime;
use farm_core::{FarmError, FarmResult};

use crate::column_types::WorkState;
use crate::model::Model;
use crate::value::Value;

/// Access to the work state columns of a model.
pub trait WorkStateFields: Model {
    /// The `state` column.
    fn state_mut(&mut self) -> &mut Option<WorkState>;

    /// The `attempts` column.
    fn attempts_mut(&mut self) -> &mut Option<i64>;
}

/// Keeps a model's `priority` within a fixed range.
///
/// # Examples
///
/// ```
/// use farm_db::mixins::ValidatePriorityMixin;
/// # use farm_db::model::{Model, ModelMeta};
/// # use farm_db::row::Row;
/// # use farm_db::value::Value;
/// # use farm_core::FarmError;
/// # #[derive(Default)]
/// # struct Job { priority: Option<i64> }
/// # impl Model for Job {
/// #     fn meta() -> &'static ModelMeta { unimplemented!() }
/// #     fn pk(&self) -> Option<Value> { None }
/// #     fn set_pk(&mut self, _: Value) {}
/// #     fn field_values(&self) -> Vec<(&'static str, Value)> { vec![] }
/// #     fn from_row(_: &Row) -> Result<Self, FarmError> { Ok(Self::default()) }
/// # }
/// impl ValidatePriorityMixin for Job {
///     fn priority_mut(&mut self) -> &mut Option<i64> {
///         &mut self.priority
///     }
/// }
///
/// let mut job = Job::default();
/// job.set_priority(1000).unwrap();
/// assert!(job.set_priority(1001).is_err());
/// assert_eq!(job.priority, Some(1000));
/// ```
pub trait ValidatePriorityMixin: Model {
    /// Lowest accepted priority.
    const MIN_PRIORITY: i64 = -1000;
    /// Highest accepted priority.
    const MAX_PRIORITY: i64 = 1000;

    /// The `priority` column.
    fn priority_mut(&mut self) -> &mut Option<i64>;

    /// Checks that `value` is an accepted priority.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::ValueError`] outside the accepted range.
    fn validate_priority(value: i64) -> FarmResult<i64> {
        if (Self::MIN_PRIORITY..=Self::MAX_PRIORITY).contains(&value) {
            Ok(value)
        } else {
            Err(FarmError::ValueError(format!(
                "priority {value} is outside [{}, {}]",
                Self::MIN_PRIORITY,
                Self::MAX_PRIORITY
            )))
        }
    }

    /// Validates and sets the priority. Unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::ValueError`] outside the accepted range.
    fn set_priority(&mut self, value: i64) -> FarmResult<()> {
        *self.priority_mut() = Some(Self::validate_priority(value)?);
        Ok(())
    }
}

/// Accepts only known work states and positive attempt counts.
pub trait ValidateWorkStateMixin: WorkStateFields {
    /// Checks that `value` names a work state, by name or code.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::ValueError`] for `NULL` or an unknown state, and
    /// [`FarmError::TypeError`] for a value that is neither a name nor a code.
    fn validate_state(value: &Value) -> FarmResult<WorkState> {
        WorkState::try_from(value)
    }

    /// Validates and sets the state. Unchanged on error.
    ///
    /// # Errors
    ///
    /// See [`validate_state`](ValidateWorkStateMixin::validate_state).
    fn set_state(&mut self, value: impl Into<Value>) -> FarmResult<()> {
        let state = Self::validate_state(&value.into())?;
        *self.state_mut() = Some(state);
        Ok(())
    }

    /// Checks that `value` is at least one attempt.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::ValueError`] for zero or a negative count.
    fn validate_attempts(value: i64) -> FarmResult<i64> {
        if value >= 1 {
            Ok(value)
        } else {
            Err(FarmError::ValueError(format!(
                "attempts must be at least 1, got {value}"
            )))
        }
    }

    /// Validates and sets the attempt count. Unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::ValueError`] for zero or a negative count.
    fn set_attempts(&mut self, value: i64) -> FarmResult<()> {
        *self.attempts_mut() = Some(Self::validate_attempts(value)?);
        Ok(())
    }
}

/// Tracks attempts and run times as the work state changes.
///
/// [`change_state`](WorkStateChangedMixin::change_state) sets the state and,
/// when it differs from the current one, calls
/// [`state_changed`](WorkStateChangedMixin::state_changed):
///
/// - `running` adds an attempt, stamps `time_started` and clears
///   `time_finished`
/// - `done` and `failed` stamp `time_finished`
///
/// Times are naive UTC.
pub trait WorkStateChangedMixin: WorkStateFields {
    /// The `time_started` column.
    fn time_started_mut(&mut self) -> &mut Option<NaiveDateTime>;

    /// The `time_finished` column.
    fn time_finished_mut(&mut self) -> &mut Option<NaiveDateTime>;

    /// Sets the state from a name, a code or a [`WorkState`].
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::ValueError`] for `NULL` or an unknown state, and
    /// [`FarmError::TypeError`] for a value that is neither a name nor a code.
    fn change_state(&mut self, value: impl Into<Value>) -> FarmResult<()> {
        let state = WorkState::try_from(&value.into())?;
        let previous = self.state_mut().replace(state);
        if previous != Some(state) {
            tracing::trace!(from = ?previous, to = %state, "work state changed");
            self.state_changed(state);
        }
        Ok(())
    }

    /// Called after the state changes to `state`.
    fn state_changed(&mut self, state: WorkState) {
        let now = chrono::Utc::now().naive_utc();
        match state {
            WorkState::Running => {
                let attempts = self.attempts_mut().unwrap_or(0) + 1;
                *self.attempts_mut() = Some(attempts);
                *self.time_started_mut() = Some(now);
                *self.time_finished_mut() = None;
            }
            WorkState::Done | WorkState::Failed => {
                *self.time_finished_mut() = Some(now);
            }
            _ => {}
        }
    }
}
