//! Leaf cases: named types that carry their own storage behavior.

use std::sync::Arc;

use propcodec_core::{Mode, TypeKey, TypeRegistry};

use crate::{error::CompileError, expr::Expr};

/// Canonical name of `key` as captured at registration.
///
/// Generated calls have to name the type, so an anonymous type is a fatal
/// [`CompileError::UnnamedType`]. Display hooks such as
/// [`CustomType::describe`](propcodec_core::CustomType::describe) are never
/// consulted.
pub fn canonical_name_for(
    registry: &TypeRegistry,
    key: TypeKey,
    role: &'static str,
) -> Result<Arc<str>, CompileError> {
    registry
        .canonical_name(key)
        .cloned()
        .ok_or(CompileError::UnnamedType { key, role })
}

/// Record subtype: serialize through the value itself, rebuild through the
/// named type.
pub(crate) fn serializable_subtype(
    registry: &TypeRegistry,
    binding: &str,
    key: TypeKey,
    mode: Mode,
) -> Result<Expr, CompileError> {
    Ok(match mode {
        Mode::Serialize => Expr::SerializeRecord {
            binding: binding.to_string(),
        },
        Mode::Deserialize => Expr::RecordFromHash {
            binding: binding.to_string(),
            type_key: key,
            type_name: canonical_name_for(registry, key, "record")?,
        },
    })
}

/// Custom scalar type: checked serialize through the registry entry point,
/// unchecked deserialize through the type itself.
pub(crate) fn custom_type(
    registry: &TypeRegistry,
    binding: &str,
    key: TypeKey,
    mode: Mode,
) -> Result<Expr, CompileError> {
    let type_name = canonical_name_for(registry, key, "custom")?;
    let binding = binding.to_string();
    Ok(match mode {
        Mode::Serialize => Expr::CheckedSerialize {
            binding,
            type_key: key,
            type_name,
        },
        Mode::Deserialize => Expr::CustomDeserialize {
            binding,
            type_key: key,
            type_name,
        },
    })
}
