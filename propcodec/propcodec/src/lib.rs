//! Record codecs compiled once per declared prop.
//!
//! Register record types (and custom scalar types) in a
//! [`TypeRegistry`](core::TypeRegistry), compile a [`CodecSet`] from it, then
//! move record objects to and from their storage hashes:
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use propcodec::{
//!     CodecSet, DeserializeOptions, SerializeOptions,
//!     core::{Object, PropDef, RecordSchema, TypeDescriptor, TypeKey, TypeRegistry, Value},
//! };
//!
//! let mut registry = TypeRegistry::new();
//! let note = registry
//!     .register_record(
//!         "Note",
//!         RecordSchema::new(vec![
//!             PropDef::new("title", TypeDescriptor::scalar(TypeKey::STRING)),
//!             PropDef::new("tags", TypeDescriptor::array(TypeDescriptor::scalar(TypeKey::STRING))),
//!         ]),
//!     )
//!     .unwrap();
//! let codecs = CodecSet::compile(Arc::new(registry)).unwrap();
//!
//! let value = Object::new(note)
//!     .with_field("title", Value::string("hello"))
//!     .with_field("tags", Value::List(vec![Value::string("a")]))
//!     .into_value();
//! let stored = codecs.serialize(&value, SerializeOptions::default()).unwrap();
//! let restored = codecs.from_hash(note, &stored, DeserializeOptions::default()).unwrap();
//! assert_eq!(restored, value);
//! ```

mod codec;
mod codecs;
mod error;
mod options;

pub use codec::{PropPlan, RecordCodec};
pub use codecs::{CodecSet, CodecSetBuilder};
pub use error::CodecError;
pub use options::{DeserializeOptions, SerializeOptions};
pub use propcodec_core as core;
pub use propcodec_transform as transform;
