//! Attribute Coercion
//!
//! Turns the raw attributes of an element into a [`PropMap`]: attribute names
//! become camelCase keys and string values become typed [`PropValue`]s.
//!
//! # Value inference
//!
//! Rules are tried in order, the first match wins:
//!
//! 1. `"true"` / `"false"` become booleans
//! 2. an empty value is a presence flag and becomes `true`
//! 3. a value starting with `{` is parsed as a JSON object
//! 4. a value starting with `[` is parsed as a JSON array
//! 5. a value that parses as a number (not NaN) becomes a number
//! 6. anything else stays a string
//!
//! Numeric-looking strings never survive as strings: a postal code such as
//! `"02138"` becomes the number `2138`.

use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::{ElementError, Result};
use super::value::PropValue;

/// Prefix dropped from attribute names before camel-casing.
const DATA_PREFIX: &str = "data-";

/// A name/value pair as exposed by an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for Attribute {
    fn from((name, value): (N, V)) -> Self {
        Attribute::new(name, value)
    }
}

/// Convert a kebab-case attribute name into a camelCase prop key.
///
/// A leading `data-` is dropped. Only a lowercase ASCII letter following a
/// hyphen is recognized; any other hyphen is kept as is.
///
/// ```rust,ignore
/// assert_eq!(camel_case("another-attribute"), "anotherAttribute");
/// assert_eq!(camel_case("data-another-attribute"), "anotherAttribute");
/// ```
pub fn camel_case(name: &str) -> String {
    let name = name.strip_prefix(DATA_PREFIX).unwrap_or(name);
    let mut key = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('-', Some(next)) if next.is_ascii_lowercase() => {
                key.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => key.push(c),
        }
    }

    key
}

/// Infer the typed value of a single attribute.
///
/// `name` is only used to report malformed JSON.
pub fn coerce_value(name: &str, value: &str) -> Result<PropValue> {
    let malformed = |source| ElementError::MalformedAttribute {
        name: name.to_string(),
        source,
    };

    match value {
        "true" => return Ok(PropValue::Boolean(true)),
        "false" => return Ok(PropValue::Boolean(false)),
        "" => return Ok(PropValue::Boolean(true)),
        _ => {}
    }

    if value.starts_with('{') {
        let map: Map<String, Value> = serde_json::from_str(value).map_err(malformed)?;
        return Ok(PropValue::Object(map));
    }

    if value.starts_with('[') {
        let items: Vec<Value> = serde_json::from_str(value).map_err(malformed)?;
        return Ok(PropValue::Array(items));
    }

    match parse_number(value) {
        Some(n) => Ok(PropValue::Number(n)),
        None => Ok(PropValue::String(value.to_string())),
    }
}

/// Parse a complete numeric literal.
///
/// Besides plain decimal and exponent forms this accepts the `Infinity`
/// spellings markup authors may write. Literals too large for `f64`, such
/// as `1e500`, overflow to infinity. `NaN` and Rust-only spellings such as
/// `inf` are rejected.
fn parse_number(value: &str) -> Option<f64> {
    let text = value.trim();
    match text {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    let n: f64 = text.parse().ok()?;
    if n.is_nan() || (n.is_infinite() && text.to_ascii_lowercase().contains("inf")) {
        return None;
    }
    Some(n)
}

/// The typed property bag of one element, keyed by camelCase name.
///
/// Keys keep the order of the attributes they came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PropMap {
    props: IndexMap<String, PropValue>,
}

impl PropMap {
    /// Create an empty prop map
    pub fn new() -> Self {
        Self::default()
    }

    /// Coerce an ordered sequence of attributes.
    ///
    /// Fails on the first attribute holding malformed JSON. When two
    /// attributes map to the same key the later one wins.
    pub fn from_attributes<'a, I>(attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Attribute>,
    {
        let mut props = IndexMap::new();
        for attribute in attributes {
            let value = coerce_value(&attribute.name, &attribute.value)?;
            props.insert(camel_case(&attribute.name), value);
        }
        Ok(PropMap { props })
    }

    /// Insert a value directly, bypassing coercion
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.props.insert(key.into(), value.into());
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    /// Check if a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.props.contains_key(key)
    }

    /// Get a boolean prop
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(PropValue::as_bool)
    }

    /// Get a number prop
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(PropValue::as_number)
    }

    /// Get a string prop
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(PropValue::as_str)
    }

    /// Get an array prop
    pub fn get_array(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(PropValue::as_array)
    }

    /// Get an object prop
    pub fn get_object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.get(key).and_then(PropValue::as_object)
    }

    /// Deserialize a prop into a structured type.
    ///
    /// Returns `Ok(None)` when the prop is absent.
    pub fn deserialize<T: DeserializeOwned>(
        &self,
        key: &str,
        expected: &'static str,
    ) -> Result<Option<T>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        serde_json::from_value(value.to_json())
            .map(Some)
            .map_err(|_| ElementError::invalid_prop(key, expected))
    }

    /// Number of props
    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Iterate over props in attribute order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Pretty-printed JSON, two-space indented
    pub fn to_pretty_json(&self) -> String {
        // Serializing string keys and prop values cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
