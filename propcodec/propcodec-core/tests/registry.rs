use std::sync::Arc;

use propcodec_core::{
    CustomType, CustomTypeError, PropDef, RecordSchema, RegistryError, TypeDescriptor, TypeKey,
    TypeRegistry, Value, checked_serialize,
};

/// Reports a misleading label for display, like a type overriding its own
/// name-reporting hook.
struct Celsius;

impl CustomType for Celsius {
    fn describe(&self) -> String {
        "Fahrenheit".to_string()
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        match value {
            Value::Float(v) if *v >= -273.15 => Ok(()),
            Value::Float(_) => Err("below absolute zero".to_string()),
            other => Err(format!("expected Float, got {}", other.variant_name())),
        }
    }

    fn serialize(&self, value: &Value) -> Result<Value, CustomTypeError> {
        Ok(Value::string(format!("{}C", value.try_f64()?.unwrap_or_default())))
    }

    fn deserialize(&self, repr: &Value) -> Result<Value, CustomTypeError> {
        let text = repr.try_str()?.unwrap_or_default();
        let degrees = text
            .strip_suffix('C')
            .and_then(|n| n.parse::<f64>().ok())
            .ok_or_else(|| CustomTypeError::malformed(format!("not a temperature: {text}")))?;
        Ok(Value::Float(degrees))
    }
}

#[test]
fn builtin_scalars_are_plain_with_fixed_keys() {
    let registry = TypeRegistry::new();
    for (name, key) in [
        ("null", TypeKey::NULL),
        ("bool", TypeKey::BOOL),
        ("int", TypeKey::INT),
        ("float", TypeKey::FLOAT),
        ("string", TypeKey::STRING),
        ("symbol", TypeKey::SYMBOL),
        ("bytes", TypeKey::BYTES),
    ] {
        assert_eq!(registry.lookup(name), Some(key));
        assert!(registry.is_plain_scalar(key));
        assert_eq!(registry.canonical_name(key).map(|n| n.as_ref()), Some(name));
    }
    assert_eq!(registry.len(), 7);
}

#[test]
fn duplicate_names_are_rejected() {
    let mut registry = TypeRegistry::new();
    registry.register_opaque("Blob").unwrap();
    assert_eq!(
        registry.register_opaque("Blob"),
        Err(RegistryError::DuplicateName {
            name: "Blob".to_string()
        })
    );
    assert!(matches!(
        registry.declare("string"),
        Err(RegistryError::DuplicateName { .. })
    ));
}

#[test]
fn setting_capabilities_on_unknown_keys_fails() {
    let mut registry = TypeRegistry::new();
    let mut other = TypeRegistry::new();
    let foreign = other.register_opaque("Foreign").unwrap();
    assert_eq!(
        registry.set_plain(foreign),
        Err(RegistryError::UnknownKey { key: foreign })
    );
}

#[test]
fn canonical_name_ignores_overridden_display_label() {
    let mut registry = TypeRegistry::new();
    let celsius = registry.register_custom("Celsius", Celsius).unwrap();

    assert_eq!(registry.display_name(celsius), "Fahrenheit");
    assert_eq!(
        registry.canonical_name(celsius).map(|n| n.as_ref()),
        Some("Celsius")
    );
}

#[test]
fn anonymous_types_have_no_canonical_name() {
    let mut registry = TypeRegistry::new();
    let key = registry.declare_anonymous();
    registry.set_custom(key, Arc::new(Celsius)).unwrap();
    assert_eq!(registry.canonical_name(key), None);
    assert!(registry.is_custom(key));
}

#[test]
fn capability_table_records_each_behavior() {
    let mut registry = TypeRegistry::new();
    let record = registry
        .register_record(
            "Point",
            RecordSchema::new(vec![PropDef::new("x", TypeDescriptor::scalar(TypeKey::INT))]),
        )
        .unwrap();
    let custom = registry.register_custom("Celsius", Celsius).unwrap();
    let plain = registry.register_plain("Decimal").unwrap();
    let opaque = registry.register_opaque("Blob").unwrap();

    assert!(registry.is_record(record) && !registry.is_custom(record));
    assert!(registry.is_custom(custom) && !registry.is_plain_scalar(custom));
    assert!(registry.is_plain_scalar(plain));
    assert!(!registry.is_record(opaque) && !registry.is_custom(opaque));
    assert!(!registry.is_plain_scalar(opaque));
    assert_eq!(registry.record_keys().collect::<Vec<_>>(), vec![record]);
    assert_eq!(registry.record(record).map(|s| s.props.len()), Some(1));
}

#[test]
fn declare_then_set_supports_self_referencing_records() {
    let mut registry = TypeRegistry::new();
    let node = registry.declare("Node").unwrap();
    registry
        .set_record(
            node,
            RecordSchema::new(vec![PropDef::new(
                "children",
                TypeDescriptor::array(TypeDescriptor::scalar(node)),
            )]),
        )
        .unwrap();
    assert!(registry.is_record(node));
}

#[test]
fn checked_serialize_validates_before_serializing() {
    let mut registry = TypeRegistry::new();
    let celsius = registry.register_custom("Celsius", Celsius).unwrap();
    let custom = registry.custom(celsius).unwrap().as_ref();

    assert_eq!(
        checked_serialize("Celsius", custom, &Value::Float(21.5)),
        Ok(Value::string("21.5C"))
    );
    assert_eq!(
        checked_serialize("Celsius", custom, &Value::Float(-300.0)),
        Err(CustomTypeError::Rejected {
            type_name: "Celsius".to_string(),
            reason: "below absolute zero".to_string(),
        })
    );
    assert!(registry.custom(TypeKey::INT).is_none());
}
