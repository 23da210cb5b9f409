//! # farm-core
//!
//! Core types for farm-models: the error enum shared by every crate in the
//! workspace, the settings system, and `tracing` setup.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - The settings struct and table naming
//! - [`settings_loader`] - Loading settings from TOML and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{FarmError, FarmResult};
pub use settings::Settings;
