use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// Loosely-typed JSON used for content fields whose shape depends on the
/// tool or message kind (tool inputs, tool results, flags).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FlexibleValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Object(BTreeMap<String, FlexibleValue>),
    Array(Vec<FlexibleValue>),
    #[default]
    Null,
}

impl FlexibleValue {
    /// Classifies a parsed JSON node. Kinds are tried in the order
    /// null, bool, integer, float, string, array, object; the first match
    /// wins, so `2.0` is an `Int` and `"42"` stays a `String`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => classify_number(number),
            Value::String(text) => Self::String(text.clone()),
            Value::Array(items) => Self::Array(items.iter().map(Self::from_json).collect()),
            Value::Object(fields) => Self::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Int(number) => Value::Number(Number::from(*number)),
            // Non-finite floats have no JSON form.
            Self::Float(number) => Number::from_f64(*number).map_or(Value::Null, Value::Number),
            Self::String(text) => Value::String(text.clone()),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&FlexibleValue> {
        match self {
            Self::Object(fields) => fields.get(key),
            _ => None,
        }
    }
}

// 2^63, the first float outside the i64 range.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn classify_number(number: &Number) -> FlexibleValue {
    if let Some(int) = number.as_i64() {
        return FlexibleValue::Int(int);
    }

    let Some(float) = number.as_f64() else {
        return FlexibleValue::Null;
    };

    if float.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&float) {
        #[allow(clippy::cast_possible_truncation)]
        let int = float as i64;
        return FlexibleValue::Int(int);
    }

    FlexibleValue::Float(float)
}

impl From<&Value> for FlexibleValue {
    fn from(value: &Value) -> Self {
        Self::from_json(value)
    }
}

impl From<Value> for FlexibleValue {
    fn from(value: Value) -> Self {
        Self::from_json(&value)
    }
}

impl From<&FlexibleValue> for Value {
    fn from(value: &FlexibleValue) -> Self {
        value.to_json()
    }
}

impl<'de> Deserialize<'de> for FlexibleValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(|value| Self::from_json(&value))
    }
}

impl Serialize for FlexibleValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}
