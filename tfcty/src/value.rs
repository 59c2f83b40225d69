use std::collections::BTreeMap;

use serde_json::Number;

use crate::Type;

/// A dynamically-typed value: concrete, explicitly null, or a placeholder
/// for a value that has not been determined yet.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A value that will exist but is not resolvable at this stage.
    Unknown,
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Lists, sets and tuples.
    List(Vec<Value>),
    /// Maps and objects.
    Object(BTreeMap<String, Value>),
    /// A value from a dynamically-typed slot, together with the concrete
    /// type that travelled with it on the wire.
    Dynamic { ty: Type, value: Box<Value> },
}

impl Value {
    /// Whether the value is resolved, seeing through dynamic type wrappers.
    pub fn is_known(&self) -> bool {
        match self {
            Value::Unknown => false,
            Value::Dynamic { value, .. } => value.is_known(),
            _ => true,
        }
    }

    /// Whether the value is null, seeing through dynamic type wrappers.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Dynamic { value, .. } => value.is_null(),
            _ => false,
        }
    }

    /// Look up an attribute of an object value.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(attrs) => attrs.get(name),
            Value::Dynamic { value, .. } => value.attr(name),
            _ => None,
        }
    }

    /// A null carrying the same dynamic type information as `self`.
    pub fn null_like(&self) -> Value {
        match self {
            Value::Dynamic { ty, .. } => Value::Dynamic {
                ty: ty.clone(),
                value: Box::new(Value::Null),
            },
            _ => Value::Null,
        }
    }
}

/// Parse a decimal string into a number, the fallback representation both
/// wire formats use for numbers outside the binary integer/float ranges.
pub(crate) fn parse_number(s: &str) -> Option<Number> {
    if let Ok(v) = s.parse::<i64>() {
        return Some(Number::from(v));
    }
    if let Ok(v) = s.parse::<u64>() {
        return Some(Number::from(v));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}
