//! # farm-models
//!
//! Custom column types for a small relational model layer: an IPv4 address
//! stored as an integer, JSON dictionaries and lists stored as text, and a
//! work state stored as its integer code.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `farm-models` to get everything, or on the individual
//! crates for finer-grained control.
//!
//! ```no_run
//! use farm_models::prelude::*;
//!
//! # async fn run() -> FarmResult<()> {
//! let settings = farm_models::core::settings_loader::from_env();
//! farm_models::core::logging::setup_logging(&settings);
//! let db = DatabaseConfig::from_settings(&settings);
//! let _backend = SqliteBackend::from_config(&db)?;
//! # Ok(())
//! # }
//! ```

/// Error types, settings, and logging setup.
pub use farm_core as core;

/// Models, fields, values, and the custom column types.
pub use farm_db as db;

/// Database backends: `SQLite`.
pub use farm_db_backends as db_backends;

/// Re-exports of commonly used types.
pub mod prelude {
    pub use farm_core::{FarmError, FarmResult, Settings};
    pub use farm_db::column_types::{
        ColumnType, Ipv4AddressType, JsonDict, JsonDictType, JsonList, JsonListType, WorkState,
        WorkStateEnumType,
    };
    pub use farm_db::executor::{commit_model, create_table, fetch_model, DbExecutor};
    pub use farm_db::fields::{FieldDef, FieldType};
    pub use farm_db::mixins::{
        ValidatePriorityMixin, ValidateWorkStateMixin, WorkStateChangedMixin, WorkStateFields,
    };
    pub use farm_db::model::{Model, ModelMeta, UtilityMixins};
    pub use farm_db::row::{FromValue, Row};
    pub use farm_db::value::Value;
    pub use farm_db_backends::{DatabaseBackend, DatabaseConfig};
    #[cfg(feature = "sqlite")]
    pub use farm_db_backends::SqliteBackend;
}

// Third-party re-exports.
pub use async_trait;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
