//! The tagged value stored in the business-data bag.

use std::collections::BTreeMap;

use arbiter_money::{Decimal, Money};
use serde::{Deserialize, Serialize};

/// A dynamically-typed business value.
///
/// The bag is heterogeneous but closed: every storable shape is a variant
/// here, and runtime type checks become tag matches. Conversions in and out
/// go through `From` impls and the [`FromValue`] accessors; no variant ever
/// coerces silently into another.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Financial(Money),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// JSON rendering for diagnostics and fault attributes.
    ///
    /// Financial amounts render as their canonical string; non-finite floats
    /// fall back to their textual form since JSON cannot carry them.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(flag) => (*flag).into(),
            Value::Int(number) => (*number).into(),
            Value::Float(number) => serde_json::Number::from_f64(*number)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(number.to_string())),
            Value::String(text) => text.clone().into(),
            Value::Financial(money) => money.to_string().into(),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(flag) => write!(f, "{flag}"),
            Value::Int(number) => write!(f, "{number}"),
            Value::Float(number) => write!(f, "{number}"),
            Value::String(text) => write!(f, "{text}"),
            Value::Financial(money) => write!(f, "{money}"),
            Value::List(_) | Value::Map(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Value {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Value {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Value {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Value {
        Value::String(value)
    }
}

impl From<Money> for Value {
    fn from(value: Money) -> Value {
        Value::Financial(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Value {
        Value::Financial(Money::new(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Value {
        Value::List(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Value {
        Value::Map(value)
    }
}

/// Strict extraction from a stored [`Value`].
///
/// `None` means the tag did not match; there is no coercion on this path. A
/// stored integer read as a string is absent, not `"42"`.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<bool> {
        match value {
            Value::Bool(flag) => Some(*flag),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<i64> {
        match value {
            Value::Int(number) => Some(*number),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<f64> {
        match value {
            Value::Float(number) => Some(*number),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<String> {
        match value {
            Value::String(text) => Some(text.clone()),
            _ => None,
        }
    }
}

impl FromValue for Money {
    fn from_value(value: &Value) -> Option<Money> {
        match value {
            Value::Financial(money) => Some(money.clone()),
            _ => None,
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: &Value) -> Option<Decimal> {
        match value {
            Value::Financial(money) => Some(*money.amount()),
            _ => None,
        }
    }
}

impl FromValue for Vec<Value> {
    fn from_value(value: &Value) -> Option<Vec<Value>> {
        match value {
            Value::List(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl FromValue for BTreeMap<String, Value> {
    fn from_value(value: &Value) -> Option<BTreeMap<String, Value>> {
        match value {
            Value::Map(entries) => Some(entries.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_is_strict_about_tags() {
        let stored = Value::Int(42);
        assert_eq!(String::from_value(&stored), None);
        assert_eq!(i64::from_value(&stored), Some(42));
        assert_eq!(bool::from_value(&stored), None);
    }

    #[test]
    fn financial_values_round_trip_through_the_variant() {
        let money = Money::parse("12.50").unwrap();
        let stored = Value::from(money.clone());
        assert_eq!(Money::from_value(&stored), Some(money));
    }

    #[test]
    fn json_rendering_covers_nested_shapes() {
        let mut map = BTreeMap::new();
        map.insert("flag".to_string(), Value::Bool(true));
        map.insert(
            "amounts".to_string(),
            Value::List(vec![Value::Int(1), Value::Float(2.5)]),
        );
        let rendered = Value::Map(map).to_json().to_string();
        assert_eq!(rendered, r#"{"amounts":[1,2.5],"flag":true}"#);
    }

    #[test]
    fn display_renders_scalars_bare() {
        assert_eq!(Value::from("  text  ").to_string(), "  text  ");
        assert_eq!(Value::Int(7).to_string(), "7");
        assert_eq!(Value::Null.to_string(), "null");
    }
}
