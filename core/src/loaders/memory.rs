use std::collections::HashMap;

use strata_sdk::{LoadResult, Loader, LoaderError, Value};

/// Serves a fixed set of namespaces held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    name: String,
    namespaces: HashMap<String, Value>,
}

impl MemoryLoader {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespaces: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>, value: impl Into<Value>) -> Self {
        self.namespaces.insert(namespace.into(), value.into());
        self
    }

    /// Build from a map of namespace name to namespace value.
    pub fn from_value(name: impl Into<String>, namespaces: Value) -> LoadResult<Self> {
        let map = match namespaces {
            Value::Map(map) => map,
            other => {
                return Err(LoaderError::invalid_config(format!(
                    "'namespaces' must be a map, got {}",
                    other.kind()
                )))
            }
        };
        Ok(Self {
            name: name.into(),
            namespaces: map.into_iter().collect(),
        })
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }
}

impl Loader for MemoryLoader {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, namespace: &str) -> LoadResult<Option<Value>> {
        Ok(self.namespaces.get(namespace).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_only_its_namespaces() {
        let loader = MemoryLoader::new("defaults").with_namespace("app", "value");
        assert_eq!(loader.name(), "defaults");
        assert_eq!(loader.load("app").unwrap(), Some(Value::from("value")));
        assert_eq!(loader.load("db").unwrap(), None);
    }

    #[test]
    fn from_map_value() {
        let value: Value =
            serde_json::from_str(r#"{"app": {"port": 8080}, "db": {"host": "x"}}"#).unwrap();
        let loader = MemoryLoader::from_value("defaults", value).unwrap();

        let mut names: Vec<_> = loader.namespaces().collect();
        names.sort_unstable();
        assert_eq!(names, ["app", "db"]);

        let result = MemoryLoader::from_value("defaults", Value::from("scalar"));
        assert!(matches!(result, Err(LoaderError::InvalidConfig(_))));
    }
}
