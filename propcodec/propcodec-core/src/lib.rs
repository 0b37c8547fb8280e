//! Shared building blocks for `propcodec`.
//!
//! This crate holds everything the transform compiler and the record
//! framework agree on: the runtime [`Value`] model, the [`TypeRegistry`]
//! capability table with registration-time names, the [`TypeDescriptor`]
//! tree describing a declared prop's static shape, and [`Mode`].

mod error;
mod json;
mod mode;
mod registry;
mod schema;
mod value;

pub use error::{CustomTypeError, RegistryError, ValueTypeError};
pub use mode::Mode;
pub use registry::{CustomType, TypeKey, TypeRegistry, checked_serialize};
pub use schema::{PropDef, PropDefs, RecordSchema, TypeDescriptor, format_prop_defs};
pub use value::{Object, Value};
