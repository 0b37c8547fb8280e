//! Per-record codecs: one serialize and one deserialize plan per prop.

use std::sync::Arc;

use propcodec_core::{Mode, Object, PropDef, RecordSchema, TypeKey, TypeRegistry, Value};
use propcodec_transform::{
    Context, Generator, Plan, RecordDispatch, TransformError, TransformResult,
};
use tracing::{debug, warn};

use crate::error::CodecError;

/// Compiled transforms of one prop.
#[derive(Debug, Clone)]
pub struct PropPlan {
    pub prop: PropDef,
    pub serialize: TransformResult,
    pub deserialize: TransformResult,
    serialize_plan: Plan,
    deserialize_plan: Plan,
}

impl PropPlan {
    fn compile(
        registry: &TypeRegistry,
        generator: Generator<'_>,
        record: &str,
        prop: &PropDef,
    ) -> Result<Self, CodecError> {
        let build = |mode: Mode| -> Result<(TransformResult, Plan), CodecError> {
            let result = generator
                .generate(&prop.ty, mode, &prop.name)
                .map_err(|source| CodecError::Compile {
                    record: record.to_string(),
                    prop: prop.name.to_string(),
                    mode,
                    source,
                })?;
            let plan = Plan::compile(registry, &result).map_err(|source| CodecError::Plan {
                record: record.to_string(),
                prop: prop.name.to_string(),
                mode,
                source,
            })?;
            Ok((result, plan))
        };

        let (serialize, serialize_plan) = build(Mode::Serialize)?;
        let (deserialize, deserialize_plan) = build(Mode::Deserialize)?;
        Ok(Self {
            prop: prop.clone(),
            serialize,
            deserialize,
            serialize_plan,
            deserialize_plan,
        })
    }

    /// The transform chosen for `mode`.
    pub fn result(&self, mode: Mode) -> &TransformResult {
        match mode {
            Mode::Serialize => &self.serialize,
            Mode::Deserialize => &self.deserialize,
        }
    }
}

/// Codec of one record type.
#[derive(Debug, Clone)]
pub struct RecordCodec {
    key: TypeKey,
    name: Arc<str>,
    props: Vec<PropPlan>,
}

impl RecordCodec {
    pub(crate) fn compile(
        registry: &TypeRegistry,
        generator: Generator<'_>,
        key: TypeKey,
        schema: &RecordSchema,
    ) -> Result<Self, CodecError> {
        let name: Arc<str> = match registry.canonical_name(key) {
            Some(name) => Arc::clone(name),
            None => Arc::from(registry.display_name(key)),
        };
        let props = schema
            .props
            .iter()
            .map(|prop| PropPlan::compile(registry, generator, &name, prop))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(record = %name, props = props.len(), "compiled record codec");
        Ok(Self { key, name, props })
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prop_plans(&self) -> &[PropPlan] {
        &self.props
    }

    fn in_prop(&self, prop: &PropDef, source: TransformError) -> TransformError {
        TransformError::InProp {
            record: self.name.to_string(),
            prop: prop.name.to_string(),
            source: Box::new(source),
        }
    }

    /// Storage hash of `record`, keyed by storage key in prop order.
    pub(crate) fn serialize(
        &self,
        record: &Object,
        strict: bool,
        records: &dyn RecordDispatch,
    ) -> Result<Value, TransformError> {
        let ctx = Context::new(records).with_strict(strict);
        let mut entries = Vec::with_capacity(self.props.len() + record.extra.len());

        for plan in &self.props {
            let prop = &plan.prop;
            if prop.dont_store {
                continue;
            }
            let value = record.get(&prop.name).unwrap_or(&Value::Null);
            if value.is_null() {
                if prop.is_required() {
                    if strict {
                        return Err(TransformError::MissingRequiredProp {
                            record: self.name.to_string(),
                            prop: prop.name.to_string(),
                        });
                    }
                    warn!(record = %self.name, prop = %prop.name, "required prop has no value, omitting");
                }
                continue;
            }
            let stored = plan
                .serialize_plan
                .apply(value, &ctx)
                .map_err(|source| self.in_prop(prop, source))?;
            entries.push((Value::string(prop.storage_key()), stored));
        }

        for (key, value) in &record.extra {
            entries.push((Value::String(Arc::clone(key)), value.clone()));
        }
        Ok(Value::Map(entries))
    }

    /// Rebuild a record object from its storage hash.
    pub(crate) fn from_hash(
        &self,
        repr: &Value,
        strict: bool,
        records: &dyn RecordDispatch,
    ) -> Result<Value, TransformError> {
        let Value::Map(entries) = repr else {
            return Err(repr.type_mismatch("Map").into());
        };
        let ctx = Context::new(records);
        let mut object = Object::new(self.key);
        let mut consumed = vec![false; entries.len()];

        for plan in &self.props {
            let prop = &plan.prop;
            let found = if prop.dont_store {
                None
            } else {
                entries
                    .iter()
                    .position(|(key, _)| storage_key(key) == Some(prop.storage_key()))
            };

            if let Some(index) = found {
                consumed[index] = true;
            }
            // A stored nil counts as absent.
            let stored = found
                .map(|index| &entries[index].1)
                .filter(|stored| !stored.is_null());

            let value = match stored {
                Some(stored) => plan
                    .deserialize_plan
                    .apply(stored, &ctx)
                    .map_err(|source| self.in_prop(prop, source))?,
                None => match &prop.default {
                    Some(default) => default.clone(),
                    None => {
                        if prop.is_required() && !prop.dont_store {
                            debug!(record = %self.name, prop = %prop.name, "required prop has no stored value");
                        }
                        Value::Null
                    }
                },
            };
            object.set(&prop.name, value);
        }

        for ((key, value), consumed) in entries.iter().zip(consumed) {
            if consumed {
                continue;
            }
            let Some(name) = storage_key(key) else {
                return Err(key.type_mismatch("String key").into());
            };
            if strict {
                return Err(TransformError::UnknownProp {
                    record: self.name.to_string(),
                    key: name.to_string(),
                });
            }
            object.extra.push((Arc::from(name), value.clone()));
        }

        Ok(object.into_value())
    }
}

fn storage_key(key: &Value) -> Option<&str> {
    match key {
        Value::String(name) | Value::Symbol(name) => Some(name.as_ref()),
        _ => None,
    }
}
