use std::sync::Arc;

use propcodec::{
    CodecError, CodecSet, DeserializeOptions, SerializeOptions,
    core::{
        CustomType, CustomTypeError, Mode, Object, PropDef, RecordSchema, TypeDescriptor,
        TypeKey, TypeRegistry, Value,
    },
    transform::{CompileError, CompileOptions, TransformError, UnionPolicy},
};
use serde_json::json;

struct Money {
    key: TypeKey,
}

impl CustomType for Money {
    fn check(&self, value: &Value) -> Result<(), String> {
        match value {
            Value::Object(object) if object.type_key == self.key => Ok(()),
            other => Err(format!("expected Money, got {}", other.variant_name())),
        }
    }

    fn serialize(&self, value: &Value) -> Result<Value, CustomTypeError> {
        let object = value
            .try_object()?
            .ok_or_else(|| CustomTypeError::malformed("null"))?;
        Ok(Value::Map(vec![
            (
                Value::string("cents"),
                object.get("cents").cloned().unwrap_or(Value::Null),
            ),
            (
                Value::string("currency"),
                object.get("currency").cloned().unwrap_or(Value::Null),
            ),
        ]))
    }

    fn deserialize(&self, repr: &Value) -> Result<Value, CustomTypeError> {
        let field = |name: &str| {
            repr.map_get(name)
                .cloned()
                .ok_or_else(|| CustomTypeError::malformed(format!("missing {name}")))
        };
        Ok(Object::new(self.key)
            .with_field("cents", field("cents")?)
            .with_field("currency", field("currency")?)
            .into_value())
    }
}

struct Shop {
    codecs: CodecSet,
    money: TypeKey,
    address: TypeKey,
    person: TypeKey,
    node: TypeKey,
}

fn string() -> TypeDescriptor {
    TypeDescriptor::scalar(TypeKey::STRING)
}

fn build_registry() -> (TypeRegistry, TypeKey, TypeKey, TypeKey, TypeKey) {
    let mut registry = TypeRegistry::new();
    let money = registry.declare("Money").unwrap();
    registry
        .set_custom(money, Arc::new(Money { key: money }))
        .unwrap();

    let address = registry
        .register_record(
            "Address",
            RecordSchema::new(vec![
                PropDef::new("street", string()),
                PropDef::new("city", TypeDescriptor::nilable(string())),
            ]),
        )
        .unwrap();

    let person = registry
        .register_record(
            "Person",
            RecordSchema::new(vec![
                PropDef::new("name", string()),
                PropDef::new("nickname", TypeDescriptor::nilable(string()))
                    .with_serialized_name("nick"),
                PropDef::new("age", TypeDescriptor::scalar(TypeKey::INT))
                    .with_default(Value::Int(0)),
                PropDef::new(
                    "home",
                    TypeDescriptor::nilable(TypeDescriptor::scalar(address)),
                ),
                PropDef::new(
                    "prices",
                    TypeDescriptor::array(TypeDescriptor::nilable(TypeDescriptor::scalar(
                        money,
                    ))),
                )
                .with_default(Value::List(vec![])),
                PropDef::new("tags", TypeDescriptor::set(string())).with_default(Value::Set(vec![])),
                PropDef::new("scratch", TypeDescriptor::Untyped).dont_store(),
            ]),
        )
        .unwrap();

    // Declared first so the schema can refer to itself.
    let node = registry.declare("Node").unwrap();
    registry
        .set_record(
            node,
            RecordSchema::new(vec![
                PropDef::new("value", TypeDescriptor::scalar(TypeKey::INT)),
                PropDef::new("next", TypeDescriptor::nilable(TypeDescriptor::scalar(node))),
            ]),
        )
        .unwrap();

    (registry, money, address, person, node)
}

impl Shop {
    fn new() -> Self {
        let (registry, money, address, person, node) = build_registry();
        let codecs = CodecSet::compile(Arc::new(registry)).unwrap();
        Self {
            codecs,
            money,
            address,
            person,
            node,
        }
    }

    fn money(&self, cents: i64, currency: &str) -> Value {
        Object::new(self.money)
            .with_field("cents", Value::Int(cents))
            .with_field("currency", Value::string(currency))
            .into_value()
    }

    fn address(&self, street: &str) -> Object {
        Object::new(self.address)
            .with_field("street", Value::string(street))
            .with_field("city", Value::Null)
    }

    fn person(&self) -> Object {
        Object::new(self.person)
            .with_field("name", Value::string("Ada"))
            .with_field("nickname", Value::string("countess"))
            .with_field("age", Value::Int(36))
            .with_field("home", self.address("St James's Square").into_value())
            .with_field(
                "prices",
                Value::List(vec![self.money(500, "GBP"), Value::Null]),
            )
            .with_field("tags", Value::Set(vec![Value::string("math")]))
            .with_field("scratch", Value::Null)
    }
}

fn keys(stored: &Value) -> Vec<String> {
    let Value::Map(entries) = stored else {
        panic!("expected map, got {stored:?}");
    };
    entries
        .iter()
        .map(|(k, _)| k.try_str().unwrap().unwrap().to_string())
        .collect()
}

#[test]
fn person_round_trips() {
    let shop = Shop::new();
    let person = shop.person().into_value();

    let stored = shop
        .codecs
        .serialize(&person, SerializeOptions::default())
        .unwrap();
    assert_eq!(keys(&stored), ["name", "nick", "age", "home", "prices", "tags"]);
    assert_eq!(
        stored.map_get("home"),
        Some(&Value::Map(vec![(
            Value::string("street"),
            Value::string("St James's Square")
        )]))
    );

    let restored = shop
        .codecs
        .from_hash(shop.person, &stored, DeserializeOptions::default())
        .unwrap();
    assert_eq!(restored, person);
}

#[test]
fn strict_serialize_rejects_missing_required_props() {
    let shop = Shop::new();
    let mut person = shop.person();
    person.set("name", Value::Null);
    let person = person.into_value();

    let err = shop
        .codecs
        .serialize(&person, SerializeOptions::strict(true))
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::Transform(TransformError::MissingRequiredProp { ref record, ref prop })
            if record == "Person" && prop == "name"
    ));

    let lenient = shop
        .codecs
        .serialize(&person, SerializeOptions::strict(false))
        .unwrap();
    assert!(!keys(&lenient).contains(&"name".to_string()));
}

#[test]
fn strictness_reaches_nested_records() {
    let shop = Shop::new();
    let mut home = shop.address("x");
    home.set("street", Value::Null);
    let mut person = shop.person();
    person.set("home", home.into_value());
    let person = person.into_value();

    let err = shop
        .codecs
        .serialize(&person, SerializeOptions::strict(true))
        .unwrap_err();
    let CodecError::Transform(TransformError::InProp { record, prop, source }) = err else {
        panic!("expected a prop error, got {err}");
    };
    assert_eq!((record.as_str(), prop.as_str()), ("Person", "home"));
    assert!(matches!(
        *source,
        TransformError::MissingRequiredProp { ref record, ref prop }
            if record == "Address" && prop == "street"
    ));

    let lenient = shop
        .codecs
        .serialize(&person, SerializeOptions::strict(false))
        .unwrap();
    assert_eq!(lenient.map_get("home"), Some(&Value::Map(vec![])));
}

#[test]
fn missing_keys_take_defaults() {
    let shop = Shop::new();
    let stored = Value::Map(vec![(Value::string("name"), Value::string("Bob"))]);

    let restored = shop
        .codecs
        .from_hash(shop.person, &stored, DeserializeOptions::default())
        .unwrap();
    let restored = restored.try_object().unwrap().unwrap();
    assert_eq!(restored.get("name"), Some(&Value::string("Bob")));
    assert_eq!(restored.get("nickname"), Some(&Value::Null));
    assert_eq!(restored.get("age"), Some(&Value::Int(0)));
    assert_eq!(restored.get("prices"), Some(&Value::List(vec![])));
    assert_eq!(restored.get("scratch"), Some(&Value::Null));
}

#[test]
fn dont_store_props_are_never_written_or_read() {
    let shop = Shop::new();
    let mut person = shop.person();
    person.set("scratch", Value::string("temporary"));

    let stored = shop
        .codecs
        .serialize(&person.into_value(), SerializeOptions::default())
        .unwrap();
    assert!(!keys(&stored).contains(&"scratch".to_string()));

    let Value::Map(mut entries) = stored else {
        panic!("expected map");
    };
    entries.push((Value::string("scratch"), Value::string("from storage")));
    let restored = shop
        .codecs
        .from_hash(shop.person, &Value::Map(entries), DeserializeOptions::default())
        .unwrap();
    let restored = restored.try_object().unwrap().unwrap();
    assert_eq!(restored.get("scratch"), Some(&Value::Null));
    // The stored key matched no stored prop, so it is kept aside.
    assert_eq!(
        restored.extra,
        vec![(Arc::from("scratch"), Value::string("from storage"))]
    );
}

#[test]
fn unknown_keys_are_kept_unless_strict() {
    let shop = Shop::new();
    let stored = Value::Map(vec![
        (Value::string("name"), Value::string("Bob")),
        (Value::string("legacy_id"), Value::Int(7)),
    ]);

    let err = shop
        .codecs
        .from_hash(shop.person, &stored, DeserializeOptions::strict(true))
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::Transform(TransformError::UnknownProp { ref key, .. }) if key == "legacy_id"
    ));

    let restored = shop
        .codecs
        .from_hash(shop.person, &stored, DeserializeOptions::default())
        .unwrap();
    let again = shop
        .codecs
        .serialize(&restored, SerializeOptions::default())
        .unwrap();
    assert_eq!(again.map_get("legacy_id"), Some(&Value::Int(7)));
    assert_eq!(keys(&again).last().map(String::as_str), Some("legacy_id"));
}

#[test]
fn self_referencing_records_round_trip() {
    let shop = Shop::new();
    let tail = Object::new(shop.node)
        .with_field("value", Value::Int(2))
        .with_field("next", Value::Null);
    let head = Object::new(shop.node)
        .with_field("value", Value::Int(1))
        .with_field("next", tail.into_value())
        .into_value();

    let stored = shop
        .codecs
        .serialize(&head, SerializeOptions::default())
        .unwrap();
    assert_eq!(
        stored,
        Value::Map(vec![
            (Value::string("value"), Value::Int(1)),
            (
                Value::string("next"),
                Value::Map(vec![(Value::string("value"), Value::Int(2))])
            ),
        ])
    );
    let restored = shop
        .codecs
        .from_hash(shop.node, &stored, DeserializeOptions::default())
        .unwrap();
    assert_eq!(restored, head);
}

#[test]
fn json_bridge_round_trips() {
    let shop = Shop::new();
    let person = shop.person().into_value();

    let json = shop
        .codecs
        .to_json(&person, SerializeOptions::default())
        .unwrap();
    assert_eq!(
        json,
        json!({
            "name": "Ada",
            "nick": "countess",
            "age": 36,
            "home": { "street": "St James's Square" },
            "prices": [{ "cents": 500, "currency": "GBP" }, null],
            "tags": ["math"],
        })
    );

    let restored = shop
        .codecs
        .from_json(shop.person, &json, DeserializeOptions::default())
        .unwrap();
    assert_eq!(restored, person);
}

#[test]
fn only_registered_records_are_accepted() {
    let shop = Shop::new();
    assert!(matches!(
        shop.codecs
            .serialize(&Value::Int(1), SerializeOptions::default()),
        Err(CodecError::NotARecord { actual: "Int" })
    ));
    assert!(matches!(
        shop.codecs
            .serialize(&shop.money(1, "EUR"), SerializeOptions::default()),
        Err(CodecError::UnknownRecord { key }) if key == shop.money
    ));
    assert!(matches!(
        shop.codecs
            .from_hash(TypeKey::STRING, &Value::Map(vec![]), DeserializeOptions::default()),
        Err(CodecError::UnknownRecord { .. })
    ));
}

#[test]
fn prop_plans_expose_the_generated_transforms() {
    let shop = Shop::new();
    let codec = shop.codecs.codec_by_name("Person").unwrap();
    assert_eq!(codec.key(), shop.person);

    let prices = codec
        .prop_plans()
        .iter()
        .find(|plan| plan.prop.name.as_ref() == "prices")
        .unwrap();
    assert_eq!(
        prices.result(Mode::Deserialize).to_string(),
        "prices.iter().map(|prices_e| if prices_e.is_null() { null } else { Money::deserialize(prices_e) }).collect::<List>()"
    );

    let name = &codec.prop_plans()[0];
    assert!(name.serialize.is_identity());
    assert!(name.deserialize.is_identity());
}

#[test]
fn unnamed_record_types_fail_at_build_time() {
    let mut registry = TypeRegistry::new();
    let anonymous = registry.declare_anonymous();
    registry
        .set_record(anonymous, RecordSchema::new(vec![PropDef::new("x", string())]))
        .unwrap();
    registry
        .register_record(
            "Holder",
            RecordSchema::new(vec![PropDef::new(
                "inner",
                TypeDescriptor::scalar(anonymous),
            )]),
        )
        .unwrap();

    let err = CodecSet::compile(Arc::new(registry)).unwrap_err();
    let CodecError::Compile {
        record,
        prop,
        mode,
        source,
    } = err
    else {
        panic!("expected a compile error, got {err}");
    };
    assert_eq!((record.as_str(), prop.as_str()), ("Holder", "inner"));
    assert_eq!(mode, Mode::Deserialize);
    assert_eq!(
        source,
        CompileError::UnnamedType {
            key: anonymous,
            role: "record"
        }
    );
}

#[test]
fn compile_options_reach_every_prop() {
    let mut registry = TypeRegistry::new();
    registry
        .register_record(
            "Reading",
            RecordSchema::new(vec![PropDef::new(
                "amount",
                TypeDescriptor::Union(vec![
                    TypeDescriptor::scalar(TypeKey::INT),
                    TypeDescriptor::scalar(TypeKey::FLOAT),
                ]),
            )]),
        )
        .unwrap();
    let registry = Arc::new(registry);

    let default = CodecSet::compile(Arc::clone(&registry)).unwrap();
    let refined = CodecSet::builder(registry)
        .with_compile_options(CompileOptions {
            union_policy: UnionPolicy::IdentityWhenAllMembersIdentity,
        })
        .build()
        .unwrap();

    let amount = |codecs: &CodecSet| {
        codecs.codec_by_name("Reading").unwrap().prop_plans()[0]
            .serialize
            .clone()
    };
    assert_eq!(amount(&default).to_string(), "deep_clone(amount)");
    assert!(amount(&refined).is_identity());
}

#[test]
fn stored_nil_counts_as_absent() {
    let shop = Shop::new();
    let stored = Value::Map(vec![
        (Value::string("name"), Value::string("Bob")),
        (Value::string("nick"), Value::Null),
        (Value::string("age"), Value::Null),
        (Value::string("tags"), Value::Null),
    ]);

    let restored = shop
        .codecs
        .from_hash(shop.person, &stored, DeserializeOptions::strict(true))
        .unwrap();
    let restored = restored.try_object().unwrap().unwrap();
    assert_eq!(restored.get("nickname"), Some(&Value::Null));
    assert_eq!(restored.get("age"), Some(&Value::Int(0)));
    assert_eq!(restored.get("tags"), Some(&Value::Set(vec![])));
    assert!(restored.extra.is_empty());
}
