//! Descriptions of transforms produced by the compiler.

use std::{fmt, sync::Arc};

use propcodec_core::TypeKey;

/// Outcome of compiling one descriptor position.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformResult {
    /// No transformation: the value can be reused as is.
    Identity,
    /// The value must be produced by evaluating the expression.
    Expression(Expr),
}

impl TransformResult {
    pub fn is_identity(&self) -> bool {
        matches!(self, TransformResult::Identity)
    }

    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            TransformResult::Identity => None,
            TransformResult::Expression(expr) => Some(expr),
        }
    }

    pub fn into_expr(self) -> Option<Expr> {
        match self {
            TransformResult::Identity => None,
            TransformResult::Expression(expr) => Some(expr),
        }
    }
}

impl fmt::Display for TransformResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformResult::Identity => f.write_str("identity"),
            TransformResult::Expression(expr) => write!(f, "{expr}"),
        }
    }
}

/// Output container built by a copy or an element-wise rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    List,
    Set,
    Map,
}

impl Container {
    pub fn as_str(&self) -> &'static str {
        match self {
            Container::List => "List",
            Container::Set => "Set",
            Container::Map => "Map",
        }
    }
}

/// How to produce the transformed value from a named binding.
///
/// Bindings are names only; nothing here is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// New container holding the same elements.
    ShallowCopy {
        binding: String,
        container: Container,
    },
    /// New list or set built by running `element` on each element, which is
    /// bound to `element_binding`.
    MapElements {
        binding: String,
        container: Container,
        element_binding: String,
        element: Box<Expr>,
    },
    /// New map with transformed keys, values or both. At least one of `key`
    /// and `value` is present; otherwise the result is a [`Expr::ShallowCopy`].
    RebuildMap {
        binding: String,
        key_binding: String,
        value_binding: String,
        key: Option<Box<Expr>>,
        value: Option<Box<Expr>>,
    },
    /// Absent stays absent, anything else goes through `inner`.
    NullGuard { binding: String, inner: Box<Expr> },
    /// Dispatch to the record's own serialization, passing strictness through.
    SerializeRecord { binding: String },
    /// Rebuild the named record type from its stored hash.
    RecordFromHash {
        binding: String,
        type_key: TypeKey,
        type_name: Arc<str>,
    },
    /// Validate with the custom type, then serialize.
    CheckedSerialize {
        binding: String,
        type_key: TypeKey,
        type_name: Arc<str>,
    },
    /// Hand the stored representation to the custom type's own deserializer.
    CustomDeserialize {
        binding: String,
        type_key: TypeKey,
        type_name: Arc<str>,
    },
    /// Copy the whole value tree.
    DeepClone { binding: String },
}

impl Expr {
    /// The binding this expression reads.
    pub fn binding(&self) -> &str {
        match self {
            Expr::ShallowCopy { binding, .. }
            | Expr::MapElements { binding, .. }
            | Expr::RebuildMap { binding, .. }
            | Expr::NullGuard { binding, .. }
            | Expr::SerializeRecord { binding }
            | Expr::RecordFromHash { binding, .. }
            | Expr::CheckedSerialize { binding, .. }
            | Expr::CustomDeserialize { binding, .. }
            | Expr::DeepClone { binding } => binding,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::ShallowCopy { binding, container } => {
                write!(f, "copy::<{}>({binding})", container.as_str())
            }
            Expr::MapElements {
                binding,
                container,
                element_binding,
                element,
            } => write!(
                f,
                "{binding}.iter().map(|{element_binding}| {element}).collect::<{}>()",
                container.as_str()
            ),
            Expr::RebuildMap {
                binding,
                key_binding,
                value_binding,
                key,
                value,
            } => {
                write!(f, "{binding}.iter().map(|({key_binding}, {value_binding})| (")?;
                match key {
                    Some(key) => write!(f, "{key}")?,
                    None => f.write_str(key_binding)?,
                }
                f.write_str(", ")?;
                match value {
                    Some(value) => write!(f, "{value}")?,
                    None => f.write_str(value_binding)?,
                }
                f.write_str(")).collect::<Map>()")
            }
            Expr::NullGuard { binding, inner } => {
                write!(f, "if {binding}.is_null() {{ null }} else {{ {inner} }}")
            }
            Expr::SerializeRecord { binding } => write!(f, "{binding}.serialize(strict)"),
            Expr::RecordFromHash {
                binding, type_name, ..
            } => write!(f, "{type_name}::from_hash({binding})"),
            Expr::CheckedSerialize {
                binding, type_name, ..
            } => write!(f, "checked_serialize({type_name}, {binding})"),
            Expr::CustomDeserialize {
                binding, type_name, ..
            } => write!(f, "{type_name}::deserialize({binding})"),
            Expr::DeepClone { binding } => write!(f, "deep_clone({binding})"),
        }
    }
}
