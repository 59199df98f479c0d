//! Schema compilation and payload validation for notification routing.
//!
//! Compile a small subset of JSON Schema (`type`, `required`, `properties`,
//! `additionalProperties` and per-property string/number constraints) into a
//! [`SchemaSpec`], store it by id, and validate notification messages against it.
//!
//! Validation never fails with an error: every problem is reported as an ordered,
//! human-readable violation inside a [`ValidationResult`].

pub mod config;
pub mod error;
pub mod spec;
pub mod store;
pub mod validator;
pub mod value;

pub use config::StoreConfig;
pub use error::{Result, SchemaError};
pub use spec::{Pattern, PropertySpec, PropertyType, SchemaSpec};
pub use store::SchemaStore;
pub use validator::{validate_spec, PayloadValidator, ValidationResult};
pub use value::{Message, Value};
