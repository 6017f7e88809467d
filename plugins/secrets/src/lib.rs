//! Loader backed by a remote secret store.
//!
//! Each namespace maps to one secret whose string payload is a JSON document.
//! Register it with a core registry under `secrets`:
//!
//! ```ignore
//! let mut registry = strata_core::default_registry();
//! registry.register("secrets", strata_plugin_secrets::factory);
//! ```

#![allow(missing_docs)]

mod client;

use std::sync::Arc;
use std::time::Duration;

use strata_sdk::{LoadResult, Loader, LoaderConfig, LoaderError, Value};

pub use client::{HttpSecretClient, SecretClient, DEFAULT_TIMEOUT};

pub struct SecretStoreLoader<C> {
    name: String,
    client: C,
    prefix: String,
}

impl<C: SecretClient> SecretStoreLoader<C> {
    pub fn new(client: C) -> Self {
        Self {
            name: "secrets".to_string(),
            client,
            prefix: String::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Prepended to the namespace to form the secret id.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn secret_id(&self, namespace: &str) -> String {
        format!("{}{}", self.prefix, namespace)
    }
}

impl<C: SecretClient> Loader for SecretStoreLoader<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, namespace: &str) -> LoadResult<Option<Value>> {
        if !is_single_segment(namespace) {
            tracing::debug!(namespace, "namespace is not a valid secret name");
            return Ok(None);
        }

        let id = self.secret_id(namespace);
        let Some(secret) = self.client.get_secret_string(&id)? else {
            return Ok(None);
        };
        if secret.is_empty() {
            return Ok(None);
        }

        let value: Value =
            serde_json::from_str(&secret).map_err(|e| LoaderError::parse(&id, e))?;
        tracing::debug!(secret_id = %id, "decoded secret");
        Ok(Some(value))
    }
}

/// A namespace must not add path segments to the configured prefix.
fn is_single_segment(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace != "."
        && namespace != ".."
        && !namespace.contains(['/', '\\'])
}

/// Registry factory. Options: `endpoint` (required), `token`, `prefix`,
/// `timeout_secs`, `name`.
pub fn factory(config: LoaderConfig) -> LoadResult<Arc<dyn Loader>> {
    let endpoint = config
        .get_str("endpoint")
        .ok_or_else(|| LoaderError::invalid_config("secrets loader requires 'endpoint'"))?;
    let timeout = config
        .get_u64("timeout_secs")
        .map_or(DEFAULT_TIMEOUT, Duration::from_secs);
    let client = HttpSecretClient::new(&endpoint, config.get_str("token"), timeout)?;

    let mut loader = SecretStoreLoader::new(client);
    if let Some(prefix) = config.get_str("prefix") {
        loader = loader.with_prefix(prefix);
    }
    if let Some(name) = config.get_str("name") {
        loader = loader.with_name(name);
    }
    Ok(Arc::new(loader))
}
