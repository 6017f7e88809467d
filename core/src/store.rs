use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use strata_sdk::{Loader, Value};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::key::{KeyParser, ParsedKey};

/// What `get` does when a loader reports a backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoaderFailurePolicy {
    /// Log the failure and move on to the next loader.
    #[default]
    Skip,
    /// Stop the chain and return the failure from `get`.
    Fail,
}

/// Namespaced configuration with lazy, first-match-wins loading.
///
/// Every operation takes `&self`; the store can be shared behind an `Arc`.
/// Loading a namespace is single-flight: concurrent misses on the same
/// namespace run the loader chain once.
pub struct ConfigStore {
    items: RwLock<HashMap<String, Value>>,
    loaders: RwLock<Vec<Arc<dyn Loader>>>,
    throw_if_not_found: AtomicBool,
    failure_policy: RwLock<LoaderFailurePolicy>,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("loaders", &self.loader_names())
            .field("throw_if_not_found", &self.throw_if_not_found())
            .finish_non_exhaustive()
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ConfigStore {
    #[must_use]
    pub fn new(loaders: Vec<Arc<dyn Loader>>) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            loaders: RwLock::new(loaders),
            throw_if_not_found: AtomicBool::new(false),
            failure_policy: RwLock::new(LoaderFailurePolicy::default()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_loader(self, loader: Arc<dyn Loader>) -> Self {
        self.add_loader(loader);
        self
    }

    #[must_use]
    pub fn with_throw_if_not_found(self, throw: bool) -> Self {
        self.set_throw_if_not_found(throw);
        self
    }

    #[must_use]
    pub fn with_loader_failure_policy(self, policy: LoaderFailurePolicy) -> Self {
        self.set_loader_failure_policy(policy);
        self
    }

    pub fn set_throw_if_not_found(&self, throw: bool) {
        self.throw_if_not_found.store(throw, Ordering::SeqCst);
    }

    pub fn throw_if_not_found(&self) -> bool {
        self.throw_if_not_found.load(Ordering::SeqCst)
    }

    pub fn set_loader_failure_policy(&self, policy: LoaderFailurePolicy) {
        *self
            .failure_policy
            .write()
            .unwrap_or_else(PoisonError::into_inner) = policy;
    }

    pub fn loader_failure_policy(&self) -> LoaderFailurePolicy {
        *self
            .failure_policy
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a loader to the end of the chain.
    pub fn add_loader(&self, loader: Arc<dyn Loader>) {
        self.write_loaders().push(loader);
    }

    /// Replace the whole loader chain.
    pub fn set_loaders(&self, loaders: Vec<Arc<dyn Loader>>) {
        *self.write_loaders() = loaders;
    }

    pub fn loader_names(&self) -> Vec<String> {
        self.read_loaders()
            .iter()
            .map(|loader| loader.name().to_string())
            .collect()
    }

    /// Look up a key, loading its namespace on a miss.
    ///
    /// Returns `Ok(None)` for missing data unless `throw_if_not_found` is
    /// set. An unparseable key is always an error.
    pub fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        match self.fetch(key)? {
            Some(value) => Ok(Some(value)),
            None if self.throw_if_not_found() => Err(StoreError::key_not_found(key)),
            None => Ok(None),
        }
    }

    /// Like `get`, falling back to `default` for missing data whatever the
    /// not-found policy.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> StoreResult<Value> {
        Ok(self.fetch(key)?.unwrap_or_else(|| default.into()))
    }

    /// Look up a key and deserialize the value into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let Some(value) = self.get(key)? else {
            return Ok(None);
        };
        serde_json::from_value(value.into())
            .map(Some)
            .map_err(|e| StoreError::Conversion {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    /// Whether a key resolves against what is already loaded. Never loads.
    pub fn has(&self, key: &str) -> bool {
        KeyParser::parse(key).is_ok_and(|parsed| self.lookup(&parsed).is_some())
    }

    /// Write a whole namespace, bypassing key parsing and loading.
    pub fn set(&self, namespace: impl Into<String>, value: impl Into<Value>) {
        self.write_items().insert(namespace.into(), value.into());
    }

    /// Replace every namespace at once, e.g. from a cached snapshot.
    pub fn set_items(&self, items: HashMap<String, Value>) {
        *self.write_items() = items;
    }

    pub fn all(&self) -> HashMap<String, Value> {
        self.read_items().clone()
    }

    fn fetch(&self, key: &str) -> StoreResult<Option<Value>> {
        let parsed = KeyParser::parse(key)?;

        if let Some(value) = self.lookup(&parsed) {
            debug!(key, "config hit");
            return Ok(Some(value));
        }

        debug!(key, namespace = parsed.namespace, "config miss, loading namespace");
        self.load(&parsed)?;
        Ok(self.lookup(&parsed))
    }

    fn lookup(&self, parsed: &ParsedKey<'_>) -> Option<Value> {
        resolve(&self.read_items(), parsed).cloned()
    }

    fn load(&self, parsed: &ParsedKey<'_>) -> StoreResult<()> {
        let gate = self.gate(parsed.namespace);
        let result = {
            let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);
            if self.lookup(parsed).is_some() {
                debug!(namespace = parsed.namespace, "namespace loaded by concurrent caller");
                Ok(())
            } else {
                self.run_loaders(parsed.namespace)
            }
        };
        self.release_gate(parsed.namespace, &gate);
        result
    }

    fn run_loaders(&self, namespace: &str) -> StoreResult<()> {
        let loaders = self.read_loaders().clone();

        for loader in &loaders {
            match loader.load(namespace) {
                Ok(Some(value)) => {
                    info!(namespace, loader = loader.name(), "loaded namespace");
                    self.write_items().insert(namespace.to_string(), value);
                    return Ok(());
                }
                Ok(None) => {
                    debug!(namespace, loader = loader.name(), "loader has no such namespace");
                }
                Err(e) => match self.loader_failure_policy() {
                    LoaderFailurePolicy::Skip => {
                        warn!(
                            namespace,
                            loader = loader.name(),
                            error = %e,
                            "loader failed, skipping"
                        );
                    }
                    LoaderFailurePolicy::Fail => {
                        return Err(StoreError::Loader {
                            loader: loader.name().to_string(),
                            source: e,
                        });
                    }
                },
            }
        }

        debug!(namespace, loaders = loaders.len(), "no loader provided namespace");
        Ok(())
    }

    fn gate(&self, namespace: &str) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(inflight.entry(namespace.to_string()).or_default())
    }

    fn release_gate(&self, namespace: &str, gate: &Arc<Mutex<()>>) {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one held by the caller.
        if Arc::strong_count(gate) <= 2 {
            inflight.remove(namespace);
        }
    }

    fn read_items(&self) -> RwLockReadGuard<'_, HashMap<String, Value>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_items(&self) -> RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_loaders(&self) -> RwLockReadGuard<'_, Vec<Arc<dyn Loader>>> {
        self.loaders.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_loaders(&self) -> RwLockWriteGuard<'_, Vec<Arc<dyn Loader>>> {
        self.loaders.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Walk `items` down to the value a parsed key names.
///
/// An absent or empty namespace does not resolve, nor does any segment
/// that is missing or that would descend into a scalar.
fn resolve<'v>(items: &'v HashMap<String, Value>, parsed: &ParsedKey<'_>) -> Option<&'v Value> {
    let root = items.get(parsed.namespace).filter(|value| !value.is_empty())?;
    parsed
        .path
        .segments()
        .try_fold(root, |current, segment| current.child(segment))
}
