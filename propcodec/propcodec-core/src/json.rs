//! Bridge between storage representations and `serde_json`.
//!
//! Storage representations are plain trees: scalars, lists and string-keyed
//! maps. Symbols are written as strings and sets as arrays; bytes and objects
//! have no JSON form.
//!
//! Reading is lossy for integers outside the `i64` range: they become
//! `Float`, so `18446744073709551615` reads back as `1.8446744073709552e19`.

use serde_json::{Map, Number};

use crate::{error::ValueTypeError, value::Value};

impl Value {
    /// Integers that fit in `i64` become `Int`; every other number becomes
    /// `Float`.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(v) => Value::Bool(*v),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::string(s),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (Value::string(k), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, ValueTypeError> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::Int(v) => serde_json::Value::Number(Number::from(*v)),
            Value::Float(v) => Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .ok_or_else(|| ValueTypeError::new("finite Float", "Float"))?,
            Value::String(s) | Value::Symbol(s) => serde_json::Value::String(s.to_string()),
            Value::List(items) | Value::Set(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(Value::to_json)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = match key {
                        Value::String(s) | Value::Symbol(s) => s.to_string(),
                        other => return Err(other.type_mismatch("String map key")),
                    };
                    map.insert(key, value.to_json()?);
                }
                serde_json::Value::Object(map)
            }
            Value::Bytes(_) | Value::Object(_) => {
                return Err(self.type_mismatch("JSON-representable value"));
            }
        })
    }
}
