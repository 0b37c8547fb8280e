//! Runtime values: in-memory prop values and their storage representations.

use std::sync::Arc;

use crate::{error::ValueTypeError, registry::TypeKey};

/// A runtime value.
///
/// The same enum carries both sides of a transform: typed in-memory values
/// (which may contain [`Object`]s) and storage representations (plain scalars,
/// lists and string-keyed maps).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Arc<str>),
    Symbol(Arc<str>),
    Bytes(Arc<[u8]>),
    List(Vec<Value>),
    /// Unordered collection without duplicates; see [`Value::insert_into_set`].
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    /// Objects are shared: cloning a `Value` clones the `Arc`, not the object.
    Object(Arc<Object>),
}

/// A typed instance: a record, a custom-typed value or an opaque object.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub type_key: TypeKey,
    pub fields: Vec<(Arc<str>, Value)>,
    /// Storage keys that matched no declared prop, kept so they round-trip.
    pub extra: Vec<(Arc<str>, Value)>,
}

impl Object {
    pub fn new(type_key: TypeKey) -> Self {
        Self {
            type_key,
            fields: Vec::new(),
            extra: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl AsRef<str>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field.as_ref() == name)
            .map(|(_, value)| value)
    }

    /// Replace the field if present, append it otherwise.
    pub fn set(&mut self, name: impl AsRef<str>, value: Value) {
        let name = name.as_ref();
        match self.fields.iter_mut().find(|(field, _)| field.as_ref() == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((Arc::from(name), value)),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(Arc::new(self))
    }

    fn deep_clone(&self) -> Object {
        let clone_pairs = |pairs: &[(Arc<str>, Value)]| {
            pairs
                .iter()
                .map(|(name, value)| (Arc::clone(name), value.deep_clone()))
                .collect()
        };
        Object {
            type_key: self.type_key,
            fields: clone_pairs(&self.fields),
            extra: clone_pairs(&self.extra),
        }
    }
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Self::String(Arc::from(s.as_ref()))
    }

    pub fn symbol(s: impl AsRef<str>) -> Self {
        Self::Symbol(Arc::from(s.as_ref()))
    }

    pub fn bytes(b: impl AsRef<[u8]>) -> Self {
        Self::Bytes(Arc::from(b.as_ref()))
    }

    pub fn object(object: Object) -> Self {
        Self::Object(Arc::new(object))
    }

    /// Build a set, dropping duplicates in insertion order.
    pub fn set_of(items: impl IntoIterator<Item = Value>) -> Self {
        let mut set = Vec::new();
        for item in items {
            Self::insert_into_set(&mut set, item);
        }
        Self::Set(set)
    }

    /// Insert `item` unless an equal element is already present.
    pub fn insert_into_set(set: &mut Vec<Value>, item: Value) {
        if !set.contains(&item) {
            set.push(item);
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Copy the whole value tree without sharing anything with `self`.
    ///
    /// Containers are rebuilt and every string, symbol, byte buffer and
    /// object gets a fresh allocation.
    pub fn deep_clone(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Bool(v) => Value::Bool(*v),
            Value::Int(v) => Value::Int(*v),
            Value::Float(v) => Value::Float(*v),
            Value::String(s) => Value::String(Arc::from(s.as_ref())),
            Value::Symbol(s) => Value::Symbol(Arc::from(s.as_ref())),
            Value::Bytes(b) => Value::Bytes(Arc::from(b.as_ref())),
            Value::List(items) => Value::List(items.iter().map(Value::deep_clone).collect()),
            Value::Set(items) => Value::Set(items.iter().map(Value::deep_clone).collect()),
            Value::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.deep_clone(), v.deep_clone()))
                    .collect(),
            ),
            Value::Object(object) => Value::Object(Arc::new(object.deep_clone())),
        }
    }

    pub fn try_bool(&self) -> Result<Option<bool>, ValueTypeError> {
        match self {
            Value::Bool(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Bool")),
        }
    }

    pub fn try_i64(&self) -> Result<Option<i64>, ValueTypeError> {
        match self {
            Value::Int(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Int")),
        }
    }

    pub fn try_f64(&self) -> Result<Option<f64>, ValueTypeError> {
        match self {
            Value::Float(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Float")),
        }
    }

    pub fn try_str(&self) -> Result<Option<&str>, ValueTypeError> {
        match self {
            Value::String(v) => Ok(Some(v.as_ref())),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("String")),
        }
    }

    pub fn try_object(&self) -> Result<Option<&Arc<Object>>, ValueTypeError> {
        match self {
            Value::Object(v) => Ok(Some(v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Object")),
        }
    }

    pub fn try_list(&self) -> Result<Option<&[Value]>, ValueTypeError> {
        match self {
            Value::List(v) => Ok(Some(v.as_slice())),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("List")),
        }
    }

    pub fn try_map(&self) -> Result<Option<&[(Value, Value)]>, ValueTypeError> {
        match self {
            Value::Map(v) => Ok(Some(v.as_slice())),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Map")),
        }
    }

    /// Look up a string key in a `Map` value.
    pub fn map_get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries
                .iter()
                .find(|(k, _)| matches!(k, Value::String(s) if s.as_ref() == key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn type_mismatch(&self, expected: impl Into<String>) -> ValueTypeError {
        ValueTypeError::new(expected, self.variant_name())
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Symbol(_) => "Symbol",
            Value::Bytes(_) => "Bytes",
            Value::List(_) => "List",
            Value::Set(_) => "Set",
            Value::Map(_) => "Map",
            Value::Object(_) => "Object",
        }
    }
}
