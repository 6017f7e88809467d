use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Free-form options handed to a loader factory.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LoaderConfig {
    #[serde(flatten)]
    pub options: HashMap<String, serde_json::Value>,
}

impl LoaderConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an arbitrary JSON value; anything but an object yields
    /// an empty config.
    #[must_use]
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Self {
                options: map.into_iter().collect(),
            },
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn with<T: Serialize>(mut self, key: &str, value: T) -> Self {
        self.options.insert(
            key.to_string(),
            serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
        );
        self
    }

    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)
    }

    pub fn get_strings(&self, key: &str) -> Option<Vec<String>> {
        self.get(key)
    }
}
