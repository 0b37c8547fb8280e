use std::sync::Arc;

use propcodec_core::{Object, TypeKey, TypeRegistry, Value, ValueTypeError};
use serde_json::json;

fn sample_object(registry: &mut TypeRegistry) -> Arc<Object> {
    let blob = registry.register_opaque("Blob").unwrap();
    Arc::new(
        Object::new(blob)
            .with_field("label", Value::string("first"))
            .with_field("sizes", Value::List(vec![Value::Int(1), Value::Int(2)])),
    )
}

#[test]
fn value_string_creates_arc_str_value() {
    let value = Value::string("hello");
    match value {
        Value::String(s) => assert_eq!(&*s, "hello"),
        other => panic!("unexpected value variant: {:?}", other),
    }
}

#[test]
fn clone_shares_objects_but_deep_clone_does_not() {
    let mut registry = TypeRegistry::new();
    let object = sample_object(&mut registry);
    let value = Value::List(vec![Value::Object(Arc::clone(&object))]);

    let Value::List(shallow) = value.clone() else {
        panic!("expected list");
    };
    let Value::Object(shared) = &shallow[0] else {
        panic!("expected object");
    };
    assert!(Arc::ptr_eq(shared, &object));

    let deep = value.deep_clone();
    assert_eq!(deep, value);
    let Value::List(items) = &deep else {
        panic!("expected list");
    };
    let Value::Object(copied) = &items[0] else {
        panic!("expected object");
    };
    assert!(!Arc::ptr_eq(copied, &object));
}

#[test]
fn deep_clone_reallocates_strings() {
    let value = Value::string("shared");
    let Value::String(original) = &value else {
        unreachable!()
    };
    let Value::String(copied) = value.deep_clone() else {
        panic!("expected string");
    };
    assert_eq!(copied, *original);
    assert!(!Arc::ptr_eq(&copied, original));
}

#[test]
fn set_of_drops_duplicates_in_insertion_order() {
    let set = Value::set_of([Value::Int(3), Value::Int(1), Value::Int(3), Value::Int(2)]);
    assert_eq!(set, Value::Set(vec![Value::Int(3), Value::Int(1), Value::Int(2)]));
}

#[test]
fn object_set_replaces_existing_fields() {
    let mut object = Object::new(TypeKey::NULL).with_field("a", Value::Int(1));
    object.set("a", Value::Int(2));
    object.set("b", Value::Bool(true));
    assert_eq!(object.fields.len(), 2);
    assert_eq!(object.get("a"), Some(&Value::Int(2)));
    assert_eq!(object.get("b"), Some(&Value::Bool(true)));
    assert_eq!(object.get("c"), None);
}

#[test]
fn typed_accessors_treat_null_as_absent() {
    assert_eq!(Value::Null.try_i64(), Ok(None));
    assert_eq!(Value::Int(4).try_i64(), Ok(Some(4)));
    assert_eq!(Value::string("x").try_str(), Ok(Some("x")));
    assert_eq!(
        Value::Bool(true).try_str(),
        Err(ValueTypeError::new("String", "Bool"))
    );
}

#[test]
fn map_get_finds_string_keys() {
    let map = Value::Map(vec![
        (Value::string("a"), Value::Int(1)),
        (Value::Int(2), Value::Int(2)),
    ]);
    assert_eq!(map.map_get("a"), Some(&Value::Int(1)));
    assert_eq!(map.map_get("b"), None);
    assert_eq!(Value::Null.map_get("a"), None);
}

#[test]
fn json_bridge_maps_storage_shapes() {
    let json = json!({
        "id": "abc",
        "count": 3,
        "ratio": 0.5,
        "tags": ["a", "b"],
        "meta": null,
    });

    let value = Value::from_json(&json);
    assert_eq!(value.map_get("count"), Some(&Value::Int(3)));
    assert_eq!(value.map_get("ratio"), Some(&Value::Float(0.5)));
    assert_eq!(value.map_get("meta"), Some(&Value::Null));
    assert_eq!(value.to_json().unwrap(), json);
}

#[test]
fn to_json_writes_symbols_as_strings_and_sets_as_arrays() {
    let value = Value::Map(vec![(
        Value::symbol("kind"),
        Value::set_of([Value::symbol("a"), Value::symbol("b")]),
    )]);
    assert_eq!(value.to_json().unwrap(), json!({ "kind": ["a", "b"] }));
}

#[test]
fn to_json_rejects_objects_and_non_string_keys() {
    let object = Object::new(TypeKey::NULL).into_value();
    assert!(object.to_json().is_err());

    let map = Value::Map(vec![(Value::Int(1), Value::Null)]);
    let err = map.to_json().unwrap_err();
    assert_eq!(err.actual, "Int");
}

#[test]
fn from_json_reads_out_of_range_integers_as_floats() {
    let json: serde_json::Value = serde_json::from_str("[9223372036854775807, 18446744073709551615]").unwrap();
    assert_eq!(
        Value::from_json(&json),
        Value::List(vec![
            Value::Int(i64::MAX),
            Value::Float(18446744073709551615_u64 as f64),
        ])
    );
}
