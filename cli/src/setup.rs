use std::collections::HashMap;
use std::io;
use std::path::Path;

use strata_config::{LogFormat, OnLoaderError, StrataConfig};
use strata_core::{default_registry, ConfigStore, LoaderFailurePolicy, LoaderRegistry, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_logging(config: &StrataConfig) {
    let filter = if config.logging.filter.is_empty() {
        config.logging.level.as_str().to_string()
    } else {
        config.logging.filter.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let fmt_layer = match config.logging.format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .pretty()
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .json()
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .compact()
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();
}

pub fn registry() -> LoaderRegistry {
    let mut registry = default_registry();
    registry.register("secrets", strata_plugin_secrets::factory);
    registry
}

pub fn build_store(config: &StrataConfig, throw: bool) -> Result<ConfigStore, String> {
    let registry = registry();
    let loaders = registry
        .create_chain(
            config
                .loaders
                .iter()
                .map(|spec| (spec.kind.as_str(), spec.loader_config())),
        )
        .map_err(|e| format!("Failed to build loader chain: {e}"))?;

    let policy = match config.store.on_loader_error {
        OnLoaderError::Skip => LoaderFailurePolicy::Skip,
        OnLoaderError::Fail => LoaderFailurePolicy::Fail,
    };

    let store = ConfigStore::new(loaders)
        .with_throw_if_not_found(throw || config.store.throw_if_not_found)
        .with_loader_failure_policy(policy);

    if let Some(ref path) = config.store.snapshot {
        restore_snapshot(&store, Path::new(path))?;
    }

    Ok(store)
}

/// Seed the store from a JSON snapshot written by `strata dump`.
fn restore_snapshot(store: &ConfigStore, path: &Path) -> Result<(), String> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no snapshot to restore");
        return Ok(());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read snapshot {}: {e}", path.display()))?;
    let items: HashMap<String, Value> = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid snapshot {}: {e}", path.display()))?;
    tracing::info!(path = %path.display(), namespaces = items.len(), "restored snapshot");
    store.set_items(items);
    Ok(())
}
