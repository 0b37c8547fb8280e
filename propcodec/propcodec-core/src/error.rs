//! Error types shared across the propcodec crates.

use crate::registry::TypeKey;

/// A value did not have the shape an accessor or conversion expected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, got {actual}")]
pub struct ValueTypeError {
    pub expected: String,
    pub actual: &'static str,
}

impl ValueTypeError {
    pub fn new(expected: impl Into<String>, actual: &'static str) -> Self {
        Self {
            expected: expected.into(),
            actual,
        }
    }
}

/// Errors raised while populating a [`TypeRegistry`](crate::TypeRegistry).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Another type was already registered under this name.
    #[error("type name '{name}' is already registered")]
    DuplicateName { name: String },

    /// The key was not issued by this registry.
    #[error("unknown type key {key}")]
    UnknownKey { key: TypeKey },
}

/// Errors returned by [`CustomType`](crate::CustomType) implementations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CustomTypeError {
    /// The checked-serialize validation refused the value.
    #[error("value rejected by custom type '{type_name}': {reason}")]
    Rejected { type_name: String, reason: String },

    /// The stored representation could not be turned back into a value.
    #[error("malformed representation: {reason}")]
    Malformed { reason: String },

    #[error(transparent)]
    ValueType(#[from] ValueTypeError),
}

impl CustomTypeError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}
