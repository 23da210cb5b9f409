//! Settings for farm-models.
//!
//! This module provides the [`Settings`] struct, which holds all configuration.
//! Settings are loaded with [`crate::settings_loader`] and passed explicitly
//! to whatever needs them.

use serde::{Deserialize, Serialize};

/// Default prefix prepended to every model table name.
pub const DEFAULT_TABLE_PREFIX: &str = "farm_";

/// The complete set of settings.
///
/// # Examples
///
/// ```
/// use farm_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.table_prefix, "farm_");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled.
    pub debug: bool,

    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,

    /// Prefix prepended to model table names.
    pub table_prefix: String,

    /// SQLite database path, or `:memory:` for an in-memory database.
    pub database: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
            database: ":memory:".to_string(),
        }
    }
}

impl Settings {
    /// Builds a table name by prepending the configured prefix.
    ///
    /// ```
    /// use farm_core::settings::Settings;
    ///
    /// let settings = Settings::default();
    /// assert_eq!(settings.table_name("jsondict_model_test"), "farm_jsondict_model_test");
    /// ```
    pub fn table_name(&self, name: &str) -> String {
        format!("{}{name}", self.table_prefix)
    }
}
