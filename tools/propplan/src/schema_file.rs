//! JSON schema files describing record types.
//!
//! ```json
//! {
//!   "plain": ["Decimal"],
//!   "opaque": ["Blob"],
//!   "records": [
//!     { "name": "Person", "props": [
//!       { "name": "name", "type": "string" },
//!       { "name": "tags", "type": { "set": "string" }, "default": [] }
//!     ] }
//!   ]
//! }
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use propcodec::core::{PropDef, RecordSchema, TypeDescriptor, TypeKey, TypeRegistry, Value};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    /// Extra plain scalar types, reused as is.
    #[serde(default)]
    pub plain: Vec<String>,
    /// Types without special behavior; their values are deep-cloned.
    #[serde(default)]
    pub opaque: Vec<String>,
    #[serde(default)]
    pub records: Vec<RecordSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordSpec {
    pub name: String,
    pub props: Vec<PropSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeSpec,
    pub serialized_name: Option<String>,
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub dont_store: bool,
}

/// A type is either a registered name (or `"untyped"`) or a compound form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    Named(String),
    Compound(CompoundSpec),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum CompoundSpec {
    Array(Box<TypeSpec>),
    Set(Box<TypeSpec>),
    Map(Box<TypeSpec>, Box<TypeSpec>),
    Nilable(Box<TypeSpec>),
    Union(Vec<TypeSpec>),
    Enum(Vec<serde_json::Value>),
    Bare(String),
}

impl SchemaFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read schema file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse schema file {}", path.display()))
    }

    /// Register every type of the file.
    ///
    /// Names are declared first, so records may refer to each other and to
    /// themselves.
    pub fn into_registry(self) -> Result<TypeRegistry> {
        let mut registry = TypeRegistry::new();
        for name in &self.plain {
            registry.register_plain(name)?;
        }
        for name in &self.opaque {
            registry.register_opaque(name)?;
        }
        let keys = self
            .records
            .iter()
            .map(|record| registry.declare(&record.name))
            .collect::<Result<Vec<_>, _>>()?;

        for (record, key) in self.records.into_iter().zip(keys) {
            let props = record
                .props
                .into_iter()
                .map(|prop| prop.resolve(&registry))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("in record '{}'", record.name))?;
            registry.set_record(key, RecordSchema::new(props))?;
        }
        Ok(registry)
    }
}

impl PropSpec {
    fn resolve(self, registry: &TypeRegistry) -> Result<PropDef> {
        let ty = self
            .ty
            .resolve(registry)
            .with_context(|| format!("in prop '{}'", self.name))?;
        let mut prop = PropDef::new(&self.name, ty);
        if let Some(name) = self.serialized_name {
            prop = prop.with_serialized_name(name);
        }
        if let Some(default) = &self.default {
            let default = default_value(default, &prop.ty);
            prop = prop.with_default(default);
        }
        if self.dont_store {
            prop = prop.dont_store();
        }
        Ok(prop)
    }
}

impl TypeSpec {
    fn resolve(&self, registry: &TypeRegistry) -> Result<TypeDescriptor> {
        Ok(match self {
            TypeSpec::Named(name) if name == "untyped" => TypeDescriptor::Untyped,
            TypeSpec::Named(name) => TypeDescriptor::scalar(lookup(registry, name)?),
            TypeSpec::Compound(compound) => match compound {
                CompoundSpec::Array(element) => TypeDescriptor::array(element.resolve(registry)?),
                CompoundSpec::Set(element) => TypeDescriptor::set(element.resolve(registry)?),
                CompoundSpec::Map(key, value) => {
                    TypeDescriptor::map(key.resolve(registry)?, value.resolve(registry)?)
                }
                CompoundSpec::Nilable(inner) => TypeDescriptor::nilable(inner.resolve(registry)?),
                CompoundSpec::Union(members) => TypeDescriptor::Union(
                    members
                        .iter()
                        .map(|member| member.resolve(registry))
                        .collect::<Result<_>>()?,
                ),
                CompoundSpec::Enum(values) => {
                    TypeDescriptor::Enumeration(values.iter().map(Value::from_json).collect())
                }
                CompoundSpec::Bare(name) => TypeDescriptor::Bare(lookup(registry, name)?),
            },
        })
    }
}

/// Read a JSON default in the in-memory shape `ty` declares: arrays under a
/// set become sets, strings under a symbol become symbols, and so on down
/// nested containers.
fn default_value(json: &serde_json::Value, ty: &TypeDescriptor) -> Value {
    use serde_json::Value as Json;

    match (ty, json) {
        (TypeDescriptor::Array(element), Json::Array(items)) => Value::List(
            items
                .iter()
                .map(|item| default_value(item, element))
                .collect(),
        ),
        (TypeDescriptor::Set(element), Json::Array(items)) => {
            Value::set_of(items.iter().map(|item| default_value(item, element)))
        }
        (TypeDescriptor::Map { key, value }, Json::Object(entries)) => Value::Map(
            entries
                .iter()
                .map(|(k, v)| {
                    (
                        default_value(&Json::String(k.clone()), key),
                        default_value(v, value),
                    )
                })
                .collect(),
        ),
        (TypeDescriptor::Union(_), json) if !json.is_null() => match ty.as_nilable() {
            Some(inner) => default_value(json, inner),
            None => Value::from_json(json),
        },
        (TypeDescriptor::Scalar(TypeKey::SYMBOL), Json::String(s)) => Value::symbol(s),
        (TypeDescriptor::Scalar(TypeKey::FLOAT), Json::Number(n)) => match n.as_f64() {
            Some(f) => Value::Float(f),
            None => Value::from_json(json),
        },
        _ => Value::from_json(json),
    }
}

fn lookup(registry: &TypeRegistry, name: &str) -> Result<TypeKey> {
    match registry.lookup(name) {
        Some(key) => Ok(key),
        None => bail!("unknown type '{name}'"),
    }
}
