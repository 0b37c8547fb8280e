use std::{ops::Deref, sync::Arc};

use crate::{
    registry::{TypeKey, TypeRegistry},
    value::Value,
};

/// Static shape of a declared prop.
///
/// Built once when the prop is declared and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// A leaf: plain scalar, custom scalar type, record type or opaque type.
    Scalar(TypeKey),
    Array(Box<TypeDescriptor>),
    Set(Box<TypeDescriptor>),
    Map {
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    /// Any of the member types. "Absence or `T`" is `[Scalar(NULL), T]`.
    Union(Vec<TypeDescriptor>),
    /// A value drawn from a fixed set.
    Enumeration(Vec<Value>),
    /// A type handle that was not wrapped as a scalar.
    Bare(TypeKey),
    /// Anything at all.
    Untyped,
}

impl TypeDescriptor {
    pub fn scalar(key: TypeKey) -> Self {
        Self::Scalar(key)
    }

    pub fn array(element: TypeDescriptor) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn set(element: TypeDescriptor) -> Self {
        Self::Set(Box::new(element))
    }

    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// "Absence or `inner`".
    pub fn nilable(inner: TypeDescriptor) -> Self {
        Self::Union(vec![Self::Scalar(TypeKey::NULL), inner])
    }

    /// The inner type if this is exactly "absence or one other type".
    pub fn as_nilable(&self) -> Option<&TypeDescriptor> {
        let TypeDescriptor::Union(members) = self else {
            return None;
        };
        let mut saw_null = false;
        let mut inner = None;
        for member in members {
            if matches!(member, TypeDescriptor::Scalar(TypeKey::NULL)) {
                saw_null = true;
            } else if inner.replace(member).is_some() {
                return None;
            }
        }
        if saw_null { inner } else { None }
    }

    /// Whether `Null` is an accepted value of this type.
    pub fn is_nilable(&self) -> bool {
        match self {
            TypeDescriptor::Scalar(TypeKey::NULL) | TypeDescriptor::Untyped => true,
            TypeDescriptor::Union(members) => members.iter().any(TypeDescriptor::is_nilable),
            _ => false,
        }
    }

    /// Underlying type of an enumeration: the distinct types of its values.
    ///
    /// One type lifts to a scalar, several to a union, none to `Untyped`.
    pub fn lift_enum(values: &[Value]) -> TypeDescriptor {
        let mut keys: Vec<TypeKey> = Vec::new();
        for value in values {
            let key = match value {
                Value::Null => TypeKey::NULL,
                Value::Bool(_) => TypeKey::BOOL,
                Value::Int(_) => TypeKey::INT,
                Value::Float(_) => TypeKey::FLOAT,
                Value::String(_) => TypeKey::STRING,
                Value::Symbol(_) => TypeKey::SYMBOL,
                Value::Bytes(_) => TypeKey::BYTES,
                Value::Object(object) => object.type_key,
                Value::List(_) | Value::Set(_) | Value::Map(_) => return TypeDescriptor::Untyped,
            };
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        match keys.as_slice() {
            [] => TypeDescriptor::Untyped,
            [key] => TypeDescriptor::Scalar(*key),
            _ => TypeDescriptor::Union(keys.into_iter().map(TypeDescriptor::Scalar).collect()),
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Array(_)
                | TypeDescriptor::Set(_)
                | TypeDescriptor::Map { .. }
                | TypeDescriptor::Union(_)
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeDescriptor::Scalar(_) => "scalar",
            TypeDescriptor::Array(_) => "array",
            TypeDescriptor::Set(_) => "set",
            TypeDescriptor::Map { .. } => "map",
            TypeDescriptor::Union(_) if self.as_nilable().is_some() => "nullable",
            TypeDescriptor::Union(_) => "union",
            TypeDescriptor::Enumeration(_) => "enum",
            TypeDescriptor::Bare(_) => "bare",
            TypeDescriptor::Untyped => "untyped",
        }
    }

    /// Render as a type expression, e.g. `Array<Nullable<Money>>`.
    pub fn describe(&self, registry: &TypeRegistry) -> String {
        let name_of = |key: TypeKey| match registry.canonical_name(key) {
            Some(name) => name.to_string(),
            None => format!("<anonymous {key}>"),
        };
        match self {
            TypeDescriptor::Scalar(key) => name_of(*key),
            TypeDescriptor::Array(element) => format!("Array<{}>", element.describe(registry)),
            TypeDescriptor::Set(element) => format!("Set<{}>", element.describe(registry)),
            TypeDescriptor::Map { key, value } => format!(
                "Map<{}, {}>",
                key.describe(registry),
                value.describe(registry)
            ),
            TypeDescriptor::Union(members) => match self.as_nilable() {
                Some(inner) => format!("Nullable<{}>", inner.describe(registry)),
                None => {
                    let members: Vec<String> =
                        members.iter().map(|m| m.describe(registry)).collect();
                    format!("Union<{}>", members.join(" | "))
                }
            },
            TypeDescriptor::Enumeration(values) => format!(
                "Enum<{}; {} values>",
                Self::lift_enum(values).describe(registry),
                values.len()
            ),
            TypeDescriptor::Bare(key) => format!("Bare<{}>", name_of(*key)),
            TypeDescriptor::Untyped => "Untyped".to_string(),
        }
    }
}

/// A declared prop of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct PropDef {
    pub name: Arc<str>,
    /// Key used in the storage representation when it differs from `name`.
    pub serialized_name: Option<Arc<str>>,
    pub ty: TypeDescriptor,
    /// Applied by `from_hash` when the key is absent.
    pub default: Option<Value>,
    /// Never written by `serialize` and never read by `from_hash`.
    pub dont_store: bool,
}

impl PropDef {
    pub fn new(name: impl AsRef<str>, ty: TypeDescriptor) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            serialized_name: None,
            ty,
            default: None,
            dont_store: false,
        }
    }

    pub fn with_serialized_name(mut self, name: impl AsRef<str>) -> Self {
        self.serialized_name = Some(Arc::from(name.as_ref()));
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn dont_store(mut self) -> Self {
        self.dont_store = true;
        self
    }

    pub fn storage_key(&self) -> &str {
        self.serialized_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.ty.is_nilable()
    }
}

/// Typed collection of [`PropDef`] in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropDefs(pub Vec<PropDef>);

impl PropDefs {
    pub fn new(props: Vec<PropDef>) -> Self {
        Self(props)
    }

    pub fn as_slice(&self) -> &[PropDef] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropDef> {
        self.0.iter()
    }

    pub fn get(&self, name: &str) -> Option<&PropDef> {
        self.0.iter().find(|prop| prop.name.as_ref() == name)
    }
}

impl From<Vec<PropDef>> for PropDefs {
    fn from(value: Vec<PropDef>) -> Self {
        Self(value)
    }
}

impl From<PropDefs> for Vec<PropDef> {
    fn from(value: PropDefs) -> Self {
        value.0
    }
}

impl AsRef<[PropDef]> for PropDefs {
    fn as_ref(&self) -> &[PropDef] {
        self.as_slice()
    }
}

impl Deref for PropDefs {
    type Target = [PropDef];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

/// Declared props of a record type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordSchema {
    pub props: PropDefs,
}

impl RecordSchema {
    pub fn new(props: impl Into<PropDefs>) -> Self {
        Self {
            props: props.into(),
        }
    }
}
