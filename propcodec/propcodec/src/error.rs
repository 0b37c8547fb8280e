//! Error types for the record framework.

use propcodec_core::{Mode, TypeKey, ValueTypeError};
use propcodec_transform::{CompileError, PlanError, TransformError};

/// Errors produced by [`CodecSet`](crate::CodecSet).
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A prop's transform could not be generated.
    #[error("cannot compile {mode} transform for {record}.{prop}: {source}")]
    Compile {
        record: String,
        prop: String,
        mode: Mode,
        #[source]
        source: CompileError,
    },

    /// A generated transform could not be turned into a plan.
    #[error("cannot build {mode} plan for {record}.{prop}: {source}")]
    Plan {
        record: String,
        prop: String,
        mode: Mode,
        #[source]
        source: PlanError,
    },

    /// Applying a plan failed.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// A storage representation did not have a JSON form, or vice versa.
    #[error(transparent)]
    ValueType(#[from] ValueTypeError),

    /// No record codec was compiled for the type.
    #[error("type {key} is not a registered record")]
    UnknownRecord { key: TypeKey },

    /// Only objects can be serialized as records.
    #[error("expected a record object, got {actual}")]
    NotARecord { actual: &'static str },
}
