//! # farm-db
//!
//! Model layer for farm-models. Provides the [`Model`](model::Model) trait,
//! field definitions, the backend-agnostic [`Value`](value::Value) enum, and
//! the custom column types that convert between application values and what
//! the database stores.
//!
//! ## Column types
//!
//! A column type is a [`ColumnType`](column_types::ColumnType) adapter
//! attached to a field through its [`FieldType`](fields::FieldType):
//!
//! - [`Ipv4AddressType`](column_types::Ipv4AddressType) stores an IPv4
//!   address as an integer in `[0, 4294967295]`
//! - [`JsonDictType`](column_types::JsonDictType) and
//!   [`JsonListType`](column_types::JsonListType) store a JSON object or
//!   array as text
//! - [`WorkStateEnumType`](column_types::WorkStateEnumType) stores a
//!   [`WorkState`](column_types::WorkState) as its integer code
//!
//! Values are converted when a model is committed
//! ([`commit_model`](executor::commit_model)) and when it is loaded
//! ([`fetch_model`](executor::fetch_model)).
//!
//! ## Module Overview
//!
//! - [`model`] - The [`Model`](model::Model) trait, [`ModelMeta`](model::ModelMeta) and
//!   [`UtilityMixins`](model::UtilityMixins)
//! - [`fields`] - Field definitions ([`FieldDef`](fields::FieldDef)) and types
//! - [`mixins`] - Priority and work state validation, state change tracking
//! - [`column_types`] - IPv4, JSON and work state column type adapters
//! - [`value`] - The [`Value`](value::Value) enum
//! - [`row`] - Result rows and typed access
//! - [`compiler`] - SQL generation
//! - [`executor`] - The [`DbExecutor`](executor::DbExecutor) trait and model persistence

// - result_large_err: FarmError is the workspace error type and should be used consistently
// - doc_markdown: backtick requirements for documentation items are too strict
// - return_self_not_must_use: builder pattern methods are self-documenting
#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::unnecessary_literal_bound)]

pub mod column_types;
pub mod compiler;
pub mod executor;
pub mod fields;
pub mod mixins;
pub mod model;
pub mod row;
pub mod value;

pub use column_types::{
    ColumnType, Ipv4AddressType, JsonDict, JsonDictType, JsonList, JsonListType, WorkState,
    WorkStateEnumType,
};
pub use compiler::SqlCompiler;
pub use executor::{apply_defaults, commit_model, create_table, fetch_model, DbExecutor};
pub use fields::{FieldDef, FieldType};
pub use mixins::{
    ValidatePriorityMixin, ValidateWorkStateMixin, WorkStateChangedMixin, WorkStateFields,
};
pub use model::{Model, ModelMeta, UtilityMixins};
pub use row::{FromValue, Row};
pub use value::Value;
