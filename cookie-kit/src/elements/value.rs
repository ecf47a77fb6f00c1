//! Prop Value Types
//!
//! Represents the typed values an attribute can coerce to.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A typed prop value produced from an attribute string.
///
/// # Examples
///
/// ```text
/// flag=""           -> Boolean(true)
/// count="42"        -> Number(42.0)
/// options='{"a":1}' -> Object({"a": 1})
/// ids="[1,2]"       -> Array([1, 2])
/// world="Earth"     -> String("Earth")
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Boolean(bool),
    Number(f64),
    String(String),
    Object(Map<String, Value>),
    Array(Vec<Value>),
}

impl PropValue {
    /// Get the boolean if this is a boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the number if this is a number value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the string if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the object if this is an object value
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            PropValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Get the elements if this is an array value
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            PropValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Name of the variant, for error messages and logs
    pub fn kind(&self) -> &'static str {
        match self {
            PropValue::Boolean(_) => "boolean",
            PropValue::Number(_) => "number",
            PropValue::String(_) => "string",
            PropValue::Object(_) => "object",
            PropValue::Array(_) => "array",
        }
    }

    /// Convert into a JSON value. Non-finite numbers become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            PropValue::Boolean(b) => Value::Bool(*b),
            PropValue::Number(n) => number_to_json(*n),
            PropValue::String(s) => Value::String(s.clone()),
            PropValue::Object(map) => Value::Object(map.clone()),
            PropValue::Array(items) => Value::Array(items.clone()),
        }
    }
}

fn is_safe_integer(n: f64) -> bool {
    n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER
}

fn number_to_json(n: f64) -> Value {
    if is_safe_integer(n) {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Format a number the way markup authors expect to read it back:
/// integral values carry no fractional part.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

impl Serialize for PropValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropValue::Boolean(b) => serializer.serialize_bool(*b),
            PropValue::Number(n) if is_safe_integer(*n) => serializer.serialize_i64(*n as i64),
            PropValue::Number(n) => serializer.serialize_f64(*n),
            PropValue::String(s) => serializer.serialize_str(s),
            PropValue::Object(map) => map.serialize(serializer),
            PropValue::Array(items) => items.serialize(serializer),
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Boolean(b) => write!(f, "{b}"),
            PropValue::Number(n) => f.write_str(&format_number(*n)),
            PropValue::String(s) => f.write_str(s),
            PropValue::Object(_) | PropValue::Array(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Boolean(b)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Number(n)
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::String(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integral_numbers_serialize_without_fraction() {
        let value = PropValue::Number(42.0);
        assert_eq!(serde_json::to_string(&value).unwrap(), "42");
        assert_eq!(value.to_json(), json!(42));
    }

    #[test]
    fn test_fractional_numbers_keep_fraction() {
        let value = PropValue::Number(1.5);
        assert_eq!(serde_json::to_string(&value).unwrap(), "1.5");
        assert_eq!(value.to_string(), "1.5");
    }

    #[test]
    fn test_non_finite_numbers() {
        let value = PropValue::Number(f64::INFINITY);
        assert_eq!(value.to_json(), Value::Null);
        assert_eq!(value.to_string(), "Infinity");
        assert_eq!(PropValue::Number(-0.0).to_string(), "0");
    }

    #[test]
    fn test_display_structured_values_as_json() {
        let value = PropValue::Array(vec![json!(1), json!(2)]);
        assert_eq!(value.to_string(), "[1,2]");
        assert_eq!(value.kind(), "array");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(PropValue::from(true).as_bool(), Some(true));
        assert_eq!(PropValue::from("x").as_str(), Some("x"));
        assert_eq!(PropValue::from(3.0).as_number(), Some(3.0));
        assert!(PropValue::from("x").as_number().is_none());
    }
}
