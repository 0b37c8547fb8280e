//! Error types for compiling and applying transforms.

use propcodec_core::{CustomTypeError, TypeKey, ValueTypeError};

/// Errors raised by [`generate`](crate::generate).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A record or custom type that generated code has to name has no
    /// canonical name. Fatal: the prop cannot be compiled.
    #[error("{role} type {key} has no canonical name")]
    UnnamedType { key: TypeKey, role: &'static str },
}

/// Errors raised by [`Plan::compile`](crate::Plan::compile).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The description names a custom type the registry does not know.
    #[error("type {key} ('{type_name}') is not a registered custom type")]
    NotCustom { key: TypeKey, type_name: String },
}

/// Errors raised while applying a [`Plan`](crate::Plan) to a value.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("value type mismatch: {0}")]
    ValueType(#[from] ValueTypeError),

    #[error("custom type '{type_name}' failed: {source}")]
    Custom {
        type_name: String,
        #[source]
        source: CustomTypeError,
    },

    /// Record dispatch was asked for a type with no compiled record codec.
    #[error("no record codec for type {key}")]
    UnknownRecord { key: TypeKey },

    /// Strict serialization found a required prop without a value.
    #[error("required prop '{prop}' of '{record}' has no value")]
    MissingRequiredProp { record: String, prop: String },

    /// Strict `from_hash` found a key matching no declared prop.
    #[error("unknown key '{key}' in stored '{record}'")]
    UnknownProp { record: String, key: String },

    /// A failure inside one prop of a record.
    #[error("{record}.{prop}: {source}")]
    InProp {
        record: String,
        prop: String,
        #[source]
        source: Box<TransformError>,
    },
}
