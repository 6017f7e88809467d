use std::collections::HashMap;
use std::sync::Arc;

use strata_sdk::{LoadResult, Loader, LoaderConfig, LoaderError, Value};

use super::file::FileLoader;
use super::memory::MemoryLoader;

pub type LoaderFactory = fn(LoaderConfig) -> LoadResult<Arc<dyn Loader>>;

pub struct LoaderRegistry {
    factories: HashMap<String, LoaderFactory>,
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LoaderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, factory: LoaderFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str, config: LoaderConfig) -> LoadResult<Arc<dyn Loader>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| LoaderError::not_registered(name))?;
        factory(config)
    }

    /// Build an ordered loader chain from `(type, config)` pairs.
    pub fn create_chain<'a, I>(&self, specs: I) -> LoadResult<Vec<Arc<dyn Loader>>>
    where
        I: IntoIterator<Item = (&'a str, LoaderConfig)>,
    {
        specs
            .into_iter()
            .map(|(name, config)| self.create(name, config))
            .collect()
    }

    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn has(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

pub fn default_registry() -> LoaderRegistry {
    let mut registry = LoaderRegistry::new();

    registry.register("file", |config| {
        let path = config
            .get_str("path")
            .ok_or_else(|| LoaderError::invalid_config("file loader requires 'path'"))?;
        let mut loader = FileLoader::new(&path);
        if let Some(extensions) = config.get_strings("extensions") {
            loader = loader.with_extensions(&extensions)?;
        }
        if let Some(expand_env) = config.get_bool("expand_env") {
            loader = loader.with_env_expansion(expand_env);
        }
        if let Some(name) = config.get_str("name") {
            loader = loader.with_name(name);
        }
        Ok(Arc::new(loader))
    });

    registry.register("memory", |config| {
        let name = config.get_str("name").unwrap_or_else(|| "memory".to_string());
        let loader = match config.options.get("namespaces") {
            Some(namespaces) => MemoryLoader::from_value(name, Value::from(namespaces.clone()))?,
            None => MemoryLoader::new(name),
        };
        Ok(Arc::new(loader))
    });

    registry
}
