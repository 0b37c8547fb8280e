//! Executable transforms.
//!
//! A [`Plan`] is a closure tree with one node per [`Expr`] node. It is built
//! once from a [`TransformResult`] and then applied to any number of values;
//! all registry lookups happen while compiling, none while applying.

use std::{fmt, sync::Arc};

use propcodec_core::{CustomType, Object, TypeKey, TypeRegistry, Value, checked_serialize};

use crate::{
    error::{PlanError, TransformError},
    expr::{Container, Expr, TransformResult},
};

/// Record behavior a plan needs at run time.
///
/// Implemented by the record framework, which owns the compiled record codecs.
pub trait RecordDispatch: Send + Sync {
    /// Serialize `record` through the codec of its own type.
    fn serialize_record(&self, record: &Arc<Object>, strict: bool) -> Result<Value, TransformError>;

    /// Rebuild a record of type `key` from its stored hash.
    fn record_from_hash(&self, key: TypeKey, repr: &Value) -> Result<Value, TransformError>;
}

/// Dispatcher for setups without records; every record call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecords;

impl RecordDispatch for NoRecords {
    fn serialize_record(&self, record: &Arc<Object>, _strict: bool) -> Result<Value, TransformError> {
        Err(TransformError::UnknownRecord {
            key: record.type_key,
        })
    }

    fn record_from_hash(&self, key: TypeKey, _repr: &Value) -> Result<Value, TransformError> {
        Err(TransformError::UnknownRecord { key })
    }
}

/// Per-call state handed to every node of a plan.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    /// Strictness passed through to nested record serialization.
    pub strict: bool,
    pub records: &'a dyn RecordDispatch,
}

impl<'a> Context<'a> {
    pub fn new(records: &'a dyn RecordDispatch) -> Self {
        Self {
            strict: false,
            records,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

type ApplyFn = dyn Fn(&Value, &Context<'_>) -> Result<Value, TransformError> + Send + Sync;

/// A compiled transform.
#[derive(Clone)]
pub struct Plan {
    apply: Arc<ApplyFn>,
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plan").finish_non_exhaustive()
    }
}

impl Plan {
    fn new(
        apply: impl Fn(&Value, &Context<'_>) -> Result<Value, TransformError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            apply: Arc::new(apply),
        }
    }

    /// Reuse the value as is. Objects inside stay shared.
    pub fn identity() -> Self {
        Self::new(|value, _| Ok(value.clone()))
    }

    /// Build the closure tree for `result`, resolving custom types in
    /// `registry` once.
    pub fn compile(registry: &TypeRegistry, result: &TransformResult) -> Result<Plan, PlanError> {
        match result {
            TransformResult::Identity => Ok(Self::identity()),
            TransformResult::Expression(expr) => Self::compile_expr(registry, expr),
        }
    }

    pub fn apply(&self, value: &Value, ctx: &Context<'_>) -> Result<Value, TransformError> {
        (self.apply)(value, ctx)
    }

    fn compile_expr(registry: &TypeRegistry, expr: &Expr) -> Result<Plan, PlanError> {
        Ok(match expr {
            Expr::ShallowCopy { container, .. } => {
                let container = *container;
                Self::new(move |value, _| shallow_copy(container, value))
            }
            Expr::MapElements {
                container, element, ..
            } => {
                let container = *container;
                let element = Self::compile_expr(registry, element)?;
                Self::new(move |value, ctx| {
                    let items = sequence_items(container, value)?;
                    match container {
                        Container::Set => {
                            let mut set = Vec::with_capacity(items.len());
                            for item in items {
                                Value::insert_into_set(&mut set, element.apply(item, ctx)?);
                            }
                            Ok(Value::Set(set))
                        }
                        _ => Ok(Value::List(
                            items
                                .iter()
                                .map(|item| element.apply(item, ctx))
                                .collect::<Result<_, _>>()?,
                        )),
                    }
                })
            }
            Expr::RebuildMap { key, value, .. } => {
                let key = key
                    .as_deref()
                    .map(|expr| Self::compile_expr(registry, expr))
                    .transpose()?;
                let value_plan = value
                    .as_deref()
                    .map(|expr| Self::compile_expr(registry, expr))
                    .transpose()?;
                Self::new(move |map, ctx| {
                    let Value::Map(entries) = map else {
                        return Err(map.type_mismatch("Map").into());
                    };
                    let mut rebuilt = Vec::with_capacity(entries.len());
                    for (k, v) in entries {
                        let k = match &key {
                            Some(plan) => plan.apply(k, ctx)?,
                            None => k.clone(),
                        };
                        let v = match &value_plan {
                            Some(plan) => plan.apply(v, ctx)?,
                            None => v.clone(),
                        };
                        rebuilt.push((k, v));
                    }
                    Ok(Value::Map(rebuilt))
                })
            }
            Expr::NullGuard { inner, .. } => {
                let inner = Self::compile_expr(registry, inner)?;
                Self::new(move |value, ctx| match value {
                    Value::Null => Ok(Value::Null),
                    _ => inner.apply(value, ctx),
                })
            }
            Expr::SerializeRecord { .. } => Self::new(|value, ctx| match value {
                Value::Object(record) => ctx.records.serialize_record(record, ctx.strict),
                other => Err(other.type_mismatch("Object").into()),
            }),
            Expr::RecordFromHash { type_key, .. } => {
                let type_key = *type_key;
                Self::new(move |repr, ctx| ctx.records.record_from_hash(type_key, repr))
            }
            Expr::CheckedSerialize {
                type_key,
                type_name,
                ..
            } => {
                let custom = resolve_custom(registry, *type_key, type_name)?;
                let type_name = Arc::clone(type_name);
                Self::new(move |value, _| {
                    checked_serialize(&type_name, custom.as_ref(), value).map_err(|source| {
                        TransformError::Custom {
                            type_name: type_name.to_string(),
                            source,
                        }
                    })
                })
            }
            Expr::CustomDeserialize {
                type_key,
                type_name,
                ..
            } => {
                let custom = resolve_custom(registry, *type_key, type_name)?;
                let type_name = Arc::clone(type_name);
                Self::new(move |repr, _| {
                    custom
                        .deserialize(repr)
                        .map_err(|source| TransformError::Custom {
                            type_name: type_name.to_string(),
                            source,
                        })
                })
            }
            Expr::DeepClone { .. } => Self::new(|value, _| Ok(value.deep_clone())),
        })
    }
}

fn resolve_custom(
    registry: &TypeRegistry,
    key: TypeKey,
    type_name: &str,
) -> Result<Arc<dyn CustomType>, PlanError> {
    registry
        .custom(key)
        .cloned()
        .ok_or_else(|| PlanError::NotCustom {
            key,
            type_name: type_name.to_string(),
        })
}

/// Elements of a list or set. Sets are also read from lists, which is how
/// they come back from storage.
fn sequence_items(container: Container, value: &Value) -> Result<&[Value], TransformError> {
    match value {
        Value::List(items) | Value::Set(items) => Ok(items.as_slice()),
        other => Err(other.type_mismatch(container.as_str()).into()),
    }
}

fn shallow_copy(container: Container, value: &Value) -> Result<Value, TransformError> {
    match container {
        Container::List => Ok(Value::List(sequence_items(container, value)?.to_vec())),
        Container::Set => Ok(Value::set_of(sequence_items(container, value)?.iter().cloned())),
        Container::Map => match value {
            Value::Map(entries) => Ok(Value::Map(entries.clone())),
            other => Err(other.type_mismatch("Map").into()),
        },
    }
}
