use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

pub type Map = BTreeMap<String, Value>;

/// A configuration value tree as produced by a loader.
///
/// Deserialization is untagged, so any self-describing serde format
/// (YAML, JSON, TOML) decodes straight into it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Null, an empty string, an empty list or an empty map.
    ///
    /// A namespace holding an empty value does not resolve. `false`, `0` and
    /// `"0"` are not empty, so a namespace set to one of them does resolve.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&Vec<Self>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up one path segment below this value.
    ///
    /// Maps are indexed by key. Lists are indexed by a decimal position,
    /// so `servers.0.host` reaches into the first list element. Scalars
    /// have no children.
    #[must_use]
    pub fn child(&self, segment: &str) -> Option<&Self> {
        match self {
            Self::Map(map) => map.get(segment),
            Self::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            other => {
                let json = serde_json::to_string(other).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Map(map)
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, Self)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::List(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Map(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        serde_json::from_str(
            r#"{"key1": "value1", "key2": {"key2_key1": "value1"}, "servers": [{"host": "a"}, {"host": "b"}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn decodes_json_into_tree() {
        let value = sample();
        let map = value.as_map().unwrap();
        assert_eq!(map["key1"], Value::from("value1"));
        assert_eq!(map["servers"].as_list().unwrap().len(), 2);
    }

    #[test]
    fn decodes_yaml_scalars() {
        let yaml = "port: 8080\nratio: 0.5\nenabled: true\nname: api\nempty: ~\n";
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(value.child("port").unwrap().as_u64(), Some(8080));
        assert_eq!(value.child("ratio").unwrap().as_f64(), Some(0.5));
        assert_eq!(value.child("enabled").unwrap().as_bool(), Some(true));
        assert_eq!(value.child("name").unwrap().as_str(), Some("api"));
        assert!(value.child("empty").unwrap().is_null());
    }

    #[test]
    fn child_indexes_maps_and_lists() {
        let value = sample();
        assert_eq!(
            value.child("key2").unwrap().child("key2_key1"),
            Some(&Value::from("value1"))
        );
        let servers = value.child("servers").unwrap();
        assert_eq!(servers.child("1").unwrap().child("host").unwrap().as_str(), Some("b"));
        assert!(servers.child("2").is_none());
        assert!(servers.child("host").is_none());
        assert!(value.child("key1").unwrap().child("anything").is_none());
    }

    #[test]
    fn emptiness() {
        assert!(Value::Null.is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::List(Vec::new()).is_empty());
        assert!(Value::Map(Map::new()).is_empty());
        assert!(!Value::from(false).is_empty());
        assert!(!Value::from(0i64).is_empty());
        assert!(!Value::from("0").is_empty());
        assert!(!sample().is_empty());
    }

    #[test]
    fn serializes_back_to_plain_json() {
        let value = Value::from_iter([
            ("a".to_string(), Value::from(1u64)),
            ("b".to_string(), Value::Null),
        ]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"a":1,"b":null}"#);
    }

    #[test]
    fn display_strings_raw_and_others_as_json() {
        assert_eq!(Value::from("plain").to_string(), "plain");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(
            Value::List(vec![Value::from("x"), Value::from(2u64)]).to_string(),
            r#"["x",2]"#
        );
    }

    #[test]
    fn non_finite_float_becomes_null() {
        assert!(Value::from(f64::NAN).is_null());
    }

    #[test]
    fn json_value_conversions() {
        let json = serde_json::json!({"nested": {"list": [1, "two", null]}});
        let value = Value::from(json.clone());
        assert_eq!(serde_json::Value::from(value), json);
    }
}
