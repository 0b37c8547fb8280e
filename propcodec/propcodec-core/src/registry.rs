//! Type registry: the capability table consulted by the transform compiler.
//!
//! Every type handle ([`TypeKey`]) maps to one entry recording, at
//! registration time, which special behaviors the type has (record schema,
//! custom scalar type, plain scalar) and its canonical name. Nothing is
//! inferred later from the type's own behavior.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    error::{CustomTypeError, RegistryError},
    schema::RecordSchema,
    value::Value,
};

/// Handle of a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(u32);

impl TypeKey {
    pub const NULL: TypeKey = TypeKey(0);
    pub const BOOL: TypeKey = TypeKey(1);
    pub const INT: TypeKey = TypeKey(2);
    pub const FLOAT: TypeKey = TypeKey(3);
    pub const STRING: TypeKey = TypeKey(4);
    pub const SYMBOL: TypeKey = TypeKey(5);
    pub const BYTES: TypeKey = TypeKey(6);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Built-in plain scalars, registered by [`TypeRegistry::new`] in key order.
const BUILTIN_SCALARS: [(&str, TypeKey); 7] = [
    ("null", TypeKey::NULL),
    ("bool", TypeKey::BOOL),
    ("int", TypeKey::INT),
    ("float", TypeKey::FLOAT),
    ("string", TypeKey::STRING),
    ("symbol", TypeKey::SYMBOL),
    ("bytes", TypeKey::BYTES),
];

/// A scalar type with its own storage conversion.
pub trait CustomType: Send + Sync {
    /// Human-facing label. Free to return anything; never used to name the
    /// type in generated transforms.
    fn describe(&self) -> String {
        String::from("custom type")
    }

    /// Validation run by the checked-serialize path.
    fn check(&self, value: &Value) -> Result<(), String> {
        let _ = value;
        Ok(())
    }

    fn serialize(&self, value: &Value) -> Result<Value, CustomTypeError>;

    fn deserialize(&self, repr: &Value) -> Result<Value, CustomTypeError>;
}

/// Run `ty`'s validation, then serialize.
pub fn checked_serialize(
    type_name: &str,
    ty: &dyn CustomType,
    value: &Value,
) -> Result<Value, CustomTypeError> {
    ty.check(value).map_err(|reason| CustomTypeError::Rejected {
        type_name: type_name.to_string(),
        reason,
    })?;
    ty.serialize(value)
}

#[derive(Clone, Default)]
struct TypeEntry {
    name: Option<Arc<str>>,
    record: Option<Arc<RecordSchema>>,
    custom: Option<Arc<dyn CustomType>>,
    plain: bool,
}

/// Registry of every type a descriptor may reference.
///
/// Populated through `&mut self` at startup, then typically frozen behind an
/// `Arc` and shared read-only.
pub struct TypeRegistry {
    entries: Vec<TypeEntry>,
    names: HashMap<Arc<str>, TypeKey>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry holding the built-in plain scalars
    /// (`null`, `bool`, `int`, `float`, `string`, `symbol`, `bytes`).
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(BUILTIN_SCALARS.len()),
            names: HashMap::new(),
        };
        for (name, key) in BUILTIN_SCALARS {
            let name: Arc<str> = Arc::from(name);
            debug_assert_eq!(registry.entries.len(), key.index());
            registry.names.insert(Arc::clone(&name), key);
            registry.entries.push(TypeEntry {
                name: Some(name),
                plain: true,
                ..TypeEntry::default()
            });
        }
        registry
    }

    fn push_entry(&mut self, name: Option<Arc<str>>) -> TypeKey {
        let key = TypeKey(self.entries.len() as u32);
        if let Some(name) = &name {
            self.names.insert(Arc::clone(name), key);
        }
        self.entries.push(TypeEntry {
            name,
            ..TypeEntry::default()
        });
        key
    }

    fn entry(&self, key: TypeKey) -> Option<&TypeEntry> {
        self.entries.get(key.index())
    }

    fn entry_mut(&mut self, key: TypeKey) -> Result<&mut TypeEntry, RegistryError> {
        self.entries
            .get_mut(key.index())
            .ok_or(RegistryError::UnknownKey { key })
    }

    /// Reserve a key under `name` without any capability yet.
    ///
    /// The name captured here is the type's canonical name for good.
    pub fn declare(&mut self, name: impl AsRef<str>) -> Result<TypeKey, RegistryError> {
        let name = name.as_ref();
        if self.names.contains_key(name) {
            return Err(RegistryError::DuplicateName {
                name: name.to_string(),
            });
        }
        Ok(self.push_entry(Some(Arc::from(name))))
    }

    /// Reserve a key for a type that has no name.
    pub fn declare_anonymous(&mut self) -> TypeKey {
        self.push_entry(None)
    }

    pub fn set_record(&mut self, key: TypeKey, schema: RecordSchema) -> Result<(), RegistryError> {
        self.entry_mut(key)?.record = Some(Arc::new(schema));
        Ok(())
    }

    pub fn set_custom(
        &mut self,
        key: TypeKey,
        ty: Arc<dyn CustomType>,
    ) -> Result<(), RegistryError> {
        self.entry_mut(key)?.custom = Some(ty);
        Ok(())
    }

    pub fn set_plain(&mut self, key: TypeKey) -> Result<(), RegistryError> {
        self.entry_mut(key)?.plain = true;
        Ok(())
    }

    pub fn register_record(
        &mut self,
        name: impl AsRef<str>,
        schema: RecordSchema,
    ) -> Result<TypeKey, RegistryError> {
        let key = self.declare(name)?;
        self.set_record(key, schema)?;
        Ok(key)
    }

    pub fn register_custom(
        &mut self,
        name: impl AsRef<str>,
        ty: impl CustomType + 'static,
    ) -> Result<TypeKey, RegistryError> {
        let key = self.declare(name)?;
        self.set_custom(key, Arc::new(ty))?;
        Ok(key)
    }

    pub fn register_plain(&mut self, name: impl AsRef<str>) -> Result<TypeKey, RegistryError> {
        let key = self.declare(name)?;
        self.set_plain(key)?;
        Ok(key)
    }

    /// Register a type with no special behavior; its values are deep-cloned.
    pub fn register_opaque(&mut self, name: impl AsRef<str>) -> Result<TypeKey, RegistryError> {
        self.declare(name)
    }

    pub fn lookup(&self, name: &str) -> Option<TypeKey> {
        self.names.get(name).copied()
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        key.index() < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The name captured when the type was declared; `None` for anonymous
    /// types and unknown keys.
    pub fn canonical_name(&self, key: TypeKey) -> Option<&Arc<str>> {
        self.entry(key).and_then(|entry| entry.name.as_ref())
    }

    /// Label for messages. Custom types report through
    /// [`CustomType::describe`], so this may differ from the canonical name.
    pub fn display_name(&self, key: TypeKey) -> String {
        match self.entry(key) {
            Some(TypeEntry {
                custom: Some(custom),
                ..
            }) => custom.describe(),
            Some(TypeEntry {
                name: Some(name), ..
            }) => name.to_string(),
            _ => format!("<anonymous {key}>"),
        }
    }

    pub fn record(&self, key: TypeKey) -> Option<&Arc<RecordSchema>> {
        self.entry(key).and_then(|entry| entry.record.as_ref())
    }

    pub fn custom(&self, key: TypeKey) -> Option<&Arc<dyn CustomType>> {
        self.entry(key).and_then(|entry| entry.custom.as_ref())
    }

    pub fn is_record(&self, key: TypeKey) -> bool {
        self.record(key).is_some()
    }

    pub fn is_custom(&self, key: TypeKey) -> bool {
        self.custom(key).is_some()
    }

    pub fn is_plain_scalar(&self, key: TypeKey) -> bool {
        self.entry(key).is_some_and(|entry| entry.plain)
    }

    /// Keys of every type with a record schema, in registration order.
    pub fn record_keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.record.is_some())
            .map(|(index, _)| TypeKey(index as u32))
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().enumerate().map(|(index, entry)| {
                let kind = if entry.record.is_some() {
                    "record"
                } else if entry.custom.is_some() {
                    "custom"
                } else if entry.plain {
                    "plain"
                } else {
                    "opaque"
                };
                (index, entry.name.as_deref(), kind)
            }))
            .finish()
    }
}
