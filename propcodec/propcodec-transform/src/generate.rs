//! The recursive decision procedure: descriptor × mode × binding → transform.

use propcodec_core::{Mode, TypeDescriptor, TypeKey, TypeRegistry};
use tracing::{debug, trace};

use crate::{
    error::CompileError,
    expr::{Container, Expr, TransformResult},
    policy::{CompileOptions, UnionPolicy},
    resolve,
};

/// Compile `ty` with default [`CompileOptions`].
///
/// Shorthand for `Generator::new(registry).generate(ty, mode, binding)`.
pub fn generate(
    registry: &TypeRegistry,
    ty: &TypeDescriptor,
    mode: Mode,
    binding: &str,
) -> Result<TransformResult, CompileError> {
    Generator::new(registry).generate(ty, mode, binding)
}

/// Transform compiler bound to a registry.
///
/// Pure: the same descriptor, mode and binding always yield the same result,
/// and nothing is cached between calls.
#[derive(Debug, Clone, Copy)]
pub struct Generator<'a> {
    registry: &'a TypeRegistry,
    options: CompileOptions,
}

impl<'a> Generator<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Decide how the value bound to `binding` is transformed in `mode`.
    pub fn generate(
        &self,
        ty: &TypeDescriptor,
        mode: Mode,
        binding: &str,
    ) -> Result<TransformResult, CompileError> {
        trace!(binding, kind = ty.kind_name(), %mode, "generating transform");
        match ty {
            TypeDescriptor::Array(element) => {
                self.elementwise(element, Container::List, mode, binding)
            }
            TypeDescriptor::Set(element) => self.elementwise(element, Container::Set, mode, binding),
            TypeDescriptor::Map { key, value } => self.map(key, value, mode, binding),
            TypeDescriptor::Scalar(key) => self.scalar(*key, mode, binding),
            TypeDescriptor::Union(members) => match ty.as_nilable() {
                Some(inner) => self.nilable(inner, mode, binding),
                None => self.general_union(members, mode, binding),
            },
            // Enumerations are transparent: same binding, underlying type.
            TypeDescriptor::Enumeration(values) => {
                self.generate(&TypeDescriptor::lift_enum(values), mode, binding)
            }
            TypeDescriptor::Bare(key) if self.registry.is_custom(*key) => {
                resolve::custom_type(self.registry, binding, *key, mode).map(expression)
            }
            TypeDescriptor::Bare(key) => Ok(self.fallback(binding, *key, "bare type")),
            TypeDescriptor::Untyped => Ok(deep_clone(binding, "untyped")),
        }
    }

    fn elementwise(
        &self,
        element: &TypeDescriptor,
        container: Container,
        mode: Mode,
        binding: &str,
    ) -> Result<TransformResult, CompileError> {
        let element_binding = format!("{binding}_e");
        let expr = match self.generate(element, mode, &element_binding)? {
            // Containers are mutable; never hand out the original.
            TransformResult::Identity => Expr::ShallowCopy {
                binding: binding.to_string(),
                container,
            },
            TransformResult::Expression(inner) => Expr::MapElements {
                binding: binding.to_string(),
                container,
                element_binding,
                element: Box::new(inner),
            },
        };
        Ok(TransformResult::Expression(expr))
    }

    fn map(
        &self,
        key: &TypeDescriptor,
        value: &TypeDescriptor,
        mode: Mode,
        binding: &str,
    ) -> Result<TransformResult, CompileError> {
        let key_binding = format!("{binding}_k");
        let value_binding = format!("{binding}_v");
        let key_expr = self.generate(key, mode, &key_binding)?.into_expr();
        let value_expr = self.generate(value, mode, &value_binding)?.into_expr();

        let expr = match (key_expr, value_expr) {
            (None, None) => Expr::ShallowCopy {
                binding: binding.to_string(),
                container: Container::Map,
            },
            (key, value) => Expr::RebuildMap {
                binding: binding.to_string(),
                key_binding,
                value_binding,
                key: key.map(Box::new),
                value: value.map(Box::new),
            },
        };
        Ok(TransformResult::Expression(expr))
    }

    fn scalar(&self, key: TypeKey, mode: Mode, binding: &str) -> Result<TransformResult, CompileError> {
        if self.registry.is_record(key) {
            resolve::serializable_subtype(self.registry, binding, key, mode).map(expression)
        } else if self.registry.is_custom(key) {
            resolve::custom_type(self.registry, binding, key, mode).map(expression)
        } else if self.registry.is_plain_scalar(key) {
            Ok(TransformResult::Identity)
        } else {
            Ok(self.fallback(binding, key, "unrecognized scalar"))
        }
    }

    fn nilable(
        &self,
        inner: &TypeDescriptor,
        mode: Mode,
        binding: &str,
    ) -> Result<TransformResult, CompileError> {
        Ok(match self.generate(inner, mode, binding)? {
            TransformResult::Identity => TransformResult::Identity,
            TransformResult::Expression(inner) => TransformResult::Expression(Expr::NullGuard {
                binding: binding.to_string(),
                inner: Box::new(inner),
            }),
        })
    }

    fn general_union(
        &self,
        members: &[TypeDescriptor],
        mode: Mode,
        binding: &str,
    ) -> Result<TransformResult, CompileError> {
        if self.options.union_policy == UnionPolicy::IdentityWhenAllMembersIdentity {
            let mut all_identity = true;
            for member in members {
                if !self.generate(member, mode, binding)?.is_identity() {
                    all_identity = false;
                    break;
                }
            }
            if all_identity {
                return Ok(TransformResult::Identity);
            }
        }
        Ok(deep_clone(binding, "general union"))
    }

    fn fallback(&self, binding: &str, key: TypeKey, reason: &'static str) -> TransformResult {
        debug!(
            binding,
            type_name = %self.registry.display_name(key),
            reason,
            "no specialised transform, falling back to deep clone"
        );
        TransformResult::Expression(Expr::DeepClone {
            binding: binding.to_string(),
        })
    }
}

fn expression(expr: Expr) -> TransformResult {
    TransformResult::Expression(expr)
}

fn deep_clone(binding: &str, reason: &'static str) -> TransformResult {
    debug!(binding, reason, "no specialised transform, falling back to deep clone");
    TransformResult::Expression(Expr::DeepClone {
        binding: binding.to_string(),
    })
}
