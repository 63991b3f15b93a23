//! Dynamic value codec.
//!
//! The remote API types some fields (template attribute values, validation
//! default values) as arbitrary JSON. The host tree only carries text, so this
//! module owns the single textual boundary encoding for those values:
//!
//! - [`encode`] turns a [`DynamicValue`] into its text form (strings verbatim,
//!   numbers in shortest decimal form, objects and arrays as canonical JSON).
//! - [`decode`] parses text back, trying strict JSON first, then a number, and
//!   finally falling back to the text itself as a string.
//! - [`KeyedCodec`] wraps a value under a single key (`{"value": <v>}`) so it can
//!   travel through one string field.
//! - [`normalize_json`] re-serializes JSON text canonically so that whitespace
//!   and key order never show up as a change.

use serde_json::{Map, Number, Value};

/// A dynamically typed value as carried between the tree and the wire.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DynamicValue {
    #[default]
    Absent,
    Bool(bool),
    Number(Number),
    String(String),
    Object(Map<String, Value>),
    Array(Vec<Value>),
}

impl DynamicValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Converts an optional wire value. JSON `null` is treated as absent.
    pub fn from_json(value: Option<Value>) -> Self {
        value.map(Self::from).unwrap_or_default()
    }

    /// Returns the wire representation, `None` when absent.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Absent => None,
            Self::Bool(b) => Some(Value::Bool(*b)),
            Self::Number(n) => Some(Value::Number(n.clone())),
            Self::String(s) => Some(Value::String(s.clone())),
            Self::Object(map) => Some(Value::Object(map.clone())),
            Self::Array(items) => Some(Value::Array(items.clone())),
        }
    }
}

impl From<Value> for DynamicValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Object(map) => Self::Object(map),
            Value::Array(items) => Self::Array(items),
        }
    }
}

/// Encodes a value into its boundary text form.
///
/// Absent values have no text. Strings are returned verbatim and never
/// re-quoted, so a string default survives the round trip without gaining
/// surrounding quotes.
pub fn encode(value: &DynamicValue) -> Option<String> {
    match value {
        DynamicValue::Absent => None,
        DynamicValue::Bool(b) => Some(b.to_string()),
        DynamicValue::Number(n) => Some(format_number(n)),
        DynamicValue::String(s) => Some(s.clone()),
        DynamicValue::Object(_) | DynamicValue::Array(_) => value
            .to_json()
            .and_then(|v| serde_json::to_string(&canonical_value(v)).ok()),
    }
}

/// Decodes boundary text: strict JSON first, then a number, then a plain string.
///
/// The JSON-first order means `"\"007\""` decodes to the string `007`, while
/// the bare text `007` (not valid JSON) decodes to the number 7.
pub fn decode(text: &str) -> DynamicValue {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return DynamicValue::from(value);
    }
    if let Some(number) = parse_number(text) {
        return DynamicValue::Number(number);
    }
    DynamicValue::String(text.to_string())
}

/// Formats a number as the shortest unambiguous decimal.
///
/// Integral values carry no fractional part (`7`, not `7.0`).
pub fn format_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

fn parse_number(text: &str) -> Option<Number> {
    let trimmed = text.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Number::from(i));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
}

/// Re-serializes JSON text in canonical form (sorted keys, no insignificant
/// whitespace). Returns `None` when the text is not valid JSON.
pub fn canonicalize_json(text: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(text).ok()?;
    serde_json::to_string(&canonical_value(parsed)).ok()
}

/// Rewrites integral floats (`1.0`) as integers (`1`), recursively, so that
/// both spellings serialize to the same text.
pub fn canonical_value(value: Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(canonical_number(n)),
        Value::Array(items) => Value::Array(items.into_iter().map(canonical_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, canonical_value(item)))
                .collect(),
        ),
        other => other,
    }
}

fn canonical_number(n: Number) -> Number {
    if n.is_i64() || n.is_u64() {
        return n;
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Number::from(f as i64)
        }
        Some(f) if f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64 => Number::from(f as u64),
        _ => n,
    }
}

/// Canonical JSON when the text parses, the original text otherwise.
pub fn normalize_json(text: &str) -> String {
    canonicalize_json(text).unwrap_or_else(|| text.to_string())
}

/// Wraps a value under a fixed key to move it through a single string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyedCodec {
    key: &'static str,
}

impl KeyedCodec {
    /// The `{"value": <v>}` codec used for template attribute values.
    pub const VALUE: KeyedCodec = KeyedCodec::new("value");

    pub const fn new(key: &'static str) -> Self {
        Self { key }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// `{"<key>": <value>}` as canonical JSON text; `None` for an absent value.
    pub fn wrap(&self, value: &DynamicValue) -> Option<String> {
        let inner = canonical_value(value.to_json()?);
        let mut map = Map::new();
        map.insert(self.key.to_string(), inner);
        serde_json::to_string(&Value::Object(map)).ok()
    }

    /// Extracts the keyed value. Missing key or unparsable text yields absent.
    pub fn unwrap(&self, text: &str) -> DynamicValue {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(mut map)) => map
                .remove(self.key)
                .map(DynamicValue::from)
                .unwrap_or_default(),
            _ => DynamicValue::Absent,
        }
    }
}
