//! Strata Configuration System
//!
//! YAML configuration for the resolver: store behaviour, the loader chain
//! and logging.
//!
//! # Configuration Loading Priority
//!
//! 1. Compiled-in defaults
//! 2. `/etc/strata/strata.yaml` (system-wide)
//! 3. `~/.config/strata/strata.yaml` (user)
//! 4. `./strata.yaml` (project-local)
//! 5. `STRATA_CONFIG=/path/to/config.yaml` (explicit)
//! 6. Environment variables (highest priority)
//!
//! # Example Configuration
//!
//! ```yaml
//! store:
//!   throw_if_not_found: false
//!   on_loader_error: skip
//!   snapshot: "./cache/strata.json"
//!
//! loaders:
//!   - type: file
//!     config:
//!       path: "~/app/config"
//!   - type: secrets
//!     config:
//!       endpoint: "https://secrets.internal"
//!       token: "${SECRETS_TOKEN}"
//!       prefix: "app/"
//!
//! logging:
//!   level: info
//! ```

#![allow(missing_docs)]

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use types::*;

/// Load configuration from default locations.
///
/// Searches for config files in order and merges them.
/// Environment variables override file values.
pub fn load() -> Result<StrataConfig, ConfigError> {
    ConfigLoader::new().load()
}

/// Load configuration from a specific file.
pub fn load_from_file(path: &str) -> Result<StrataConfig, ConfigError> {
    ConfigLoader::new().with_file(path).load()
}
