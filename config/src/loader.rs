use crate::{ConfigError, LoaderSpec, StrataConfig};
use serde_yaml::Value as Yaml;
use std::path::PathBuf;
use strata_sdk::expand_env_vars;

pub struct ConfigLoader {
    explicit_file: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        let mut search_paths = Vec::new();

        if let Some(home) = dirs::home_dir() {
            search_paths.push(home.join(".config/strata/strata.yaml"));
        }
        search_paths.push(PathBuf::from("./strata.yaml"));

        #[cfg(unix)]
        search_paths.insert(0, PathBuf::from("/etc/strata/strata.yaml"));

        Self {
            explicit_file: None,
            search_paths,
        }
    }

    #[must_use]
    pub fn with_file(mut self, path: &str) -> Self {
        self.explicit_file = Some(PathBuf::from(path));
        self
    }

    #[must_use]
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    pub fn load(&self) -> Result<StrataConfig, ConfigError> {
        let mut config = StrataConfig::default();

        if let Ok(env_path) = std::env::var("STRATA_CONFIG") {
            config = self.parse_file(&PathBuf::from(env_path))?;
        } else if let Some(ref explicit) = self.explicit_file {
            config = self.parse_file(explicit)?;
        } else {
            for path in &self.search_paths {
                if path.is_file() {
                    let content = read(path)?;
                    config = self.merge_yaml(&config, &content)?;
                    tracing::debug!(path = %path.display(), "merged config file");
                }
            }
        }

        self.apply_env_overrides(&mut config)?;
        Ok(config)
    }

    fn parse_file(&self, path: &PathBuf) -> Result<StrataConfig, ConfigError> {
        let content = read(path)?;
        self.parse_yaml(&content)
    }

    fn parse_yaml(&self, content: &str) -> Result<StrataConfig, ConfigError> {
        let expanded = expand_env_vars(content);
        Ok(serde_yaml::from_str(&expanded)?)
    }

    /// Sections present in `content` replace those of `base`; for mapping
    /// sections only the keys that are set are replaced.
    fn merge_yaml(
        &self,
        base: &StrataConfig,
        content: &str,
    ) -> Result<StrataConfig, ConfigError> {
        let expanded = expand_env_vars(content);
        let overlay = match serde_yaml::from_str::<Yaml>(&expanded)? {
            Yaml::Mapping(mapping) => mapping,
            Yaml::Null => return Ok(base.clone()),
            _ => {
                return Err(ConfigError::InvalidValue(
                    "config file must contain a mapping".to_string(),
                ))
            }
        };

        let mut merged = serde_yaml::to_value(base)?;
        if let Yaml::Mapping(ref mut merged) = merged {
            for (section, value) in overlay {
                match (merged.get_mut(&section), value) {
                    (Some(Yaml::Mapping(current)), Yaml::Mapping(update)) => {
                        for (key, value) in update {
                            current.insert(key, value);
                        }
                    }
                    (_, value) => {
                        merged.insert(section, value);
                    }
                }
            }
        }

        Ok(serde_yaml::from_value(merged)?)
    }

    fn apply_env_overrides(&self, config: &mut StrataConfig) -> Result<(), ConfigError> {
        if let Ok(throw) = std::env::var("STRATA_THROW_IF_NOT_FOUND") {
            config.store.throw_if_not_found = parse_bool("STRATA_THROW_IF_NOT_FOUND", &throw)?;
        }
        if let Ok(mode) = std::env::var("STRATA_ON_LOADER_ERROR") {
            config.store.on_loader_error = serde_yaml::from_str(&mode).map_err(|_| {
                ConfigError::InvalidValue(format!(
                    "STRATA_ON_LOADER_ERROR: expected skip or fail, got '{mode}'"
                ))
            })?;
        }
        if let Ok(snapshot) = std::env::var("STRATA_SNAPSHOT") {
            if !snapshot.is_empty() {
                config.store.snapshot = Some(snapshot);
            }
        }
        if let Ok(dir) = std::env::var("STRATA_CONFIG_DIR") {
            if !dir.is_empty() {
                config.loaders.insert(0, LoaderSpec::file(&dir));
            }
        }
        if let Ok(level) = std::env::var("STRATA_LOG_LEVEL") {
            config.logging.level = serde_yaml::from_str(&level).map_err(|_| {
                ConfigError::InvalidValue(format!(
                    "STRATA_LOG_LEVEL: expected trace, debug, info, warn or error, got '{level}'"
                ))
            })?;
        }
        Ok(())
    }
}

fn read(path: &PathBuf) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.clone(),
        source: e,
    })
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidValue(format!(
            "{name}: expected a boolean, got '{other}'"
        ))),
    }
}
