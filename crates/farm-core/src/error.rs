//! Core error types for farm-models.
//!
//! This module provides the error enum [`FarmError`] shared by the column
//! types, the model layer, and the database backends. Conversion failures
//! raised by a column type (`ValueError`, `TypeError`) are wrapped into a
//! [`FarmError::StatementError`] once they occur while a statement is being
//! prepared for the database.

use thiserror::Error;

/// The primary error type for farm-models.
///
/// Variants are grouped by where they originate: column value conversion,
/// statement execution, configuration, and serialization.
#[derive(Error, Debug)]
pub enum FarmError {
    // ── Column conversion ────────────────────────────────────────────

    /// A value has the right kind but is not acceptable (for example an
    /// integer outside the IPv4 range or an unparseable address).
    #[error("Value error: {0}")]
    ValueError(String),

    /// A value has the wrong kind for the column it is bound to.
    #[error("Type error: {0}")]
    TypeError(String),

    /// A conversion failed while a statement was being prepared.
    ///
    /// This is what callers see at commit time when a model holds a value
    /// its column type refuses.
    #[error("Statement error on \"{table}\".\"{column}\": {source}")]
    StatementError {
        /// The table the statement targets.
        table: String,
        /// The column whose value was rejected.
        column: String,
        /// The conversion error raised by the column type.
        source: Box<FarmError>,
    },

    // ── ORM errors ───────────────────────────────────────────────────

    /// Raised when a query expected exactly one result but found none.
    #[error("Object does not exist: {0}")]
    DoesNotExist(String),

    /// Raised when a query expected exactly one result but found multiple.
    #[error("Multiple objects returned when one expected: {0}")]
    MultipleObjectsReturned(String),

    /// A generic database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// An operational database error (open failure, pragma failure, etc.).
    #[error("Operational error: {0}")]
    OperationalError(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FarmError {
    /// Wraps a conversion error into a statement-level error.
    pub fn statement(
        table: impl Into<String>,
        column: impl Into<String>,
        source: FarmError,
    ) -> Self {
        Self::StatementError {
            table: table.into(),
            column: column.into(),
            source: Box::new(source),
        }
    }

    /// Returns `true` for errors raised by a column type conversion.
    pub const fn is_conversion_error(&self) -> bool {
        matches!(
            self,
            Self::ValueError(_) | Self::TypeError(_) | Self::SerializationError(_)
        )
    }

    /// Returns the conversion error wrapped by a `StatementError`, if any.
    pub fn statement_source(&self) -> Option<&FarmError> {
        match self {
            Self::StatementError { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// A convenience type alias for `Result<T, FarmError>`.
pub type FarmResult<T> = Result<T, FarmError>;
