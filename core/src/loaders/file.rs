use std::path::{Path, PathBuf};

use strata_sdk::{expand_env_vars, LoadResult, Loader, LoaderError, Value};
use tracing::debug;

pub const DEFAULT_EXTENSIONS: &[&str] = &["yaml", "yml", "json", "toml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
    Toml,
}

impl FileFormat {
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    fn parse(self, content: &str, path: &Path) -> LoadResult<Value> {
        let source_name = path.display().to_string();
        match self {
            Self::Yaml => serde_yaml::from_str::<serde_yaml::Value>(content)
                .map_err(|e| e.to_string())
                .and_then(from_yaml),
            Self::Json => serde_json::from_str::<serde_json::Value>(content)
                .map(Value::from)
                .map_err(|e| e.to_string()),
            Self::Toml => toml::from_str::<toml::Value>(content)
                .map(from_toml)
                .map_err(|e| e.to_string()),
        }
        .map_err(|message| LoaderError::parse(source_name, message))
    }
}

/// Mapping keys become strings; non-finite floats keep their YAML spelling.
fn from_yaml(yaml: serde_yaml::Value) -> Result<Value, String> {
    Ok(match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => yaml_number(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::List(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<Result<_, _>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => Value::Map(
            mapping
                .into_iter()
                .map(|(key, value)| Ok((yaml_key(key)?, from_yaml(value)?)))
                .collect::<Result<_, String>>()?,
        ),
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(u) = n.as_u64() {
        Value::from(u)
    } else if let Some(i) = n.as_i64() {
        Value::from(i)
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map_or_else(|| Value::String(n.to_string()), Value::Number)
    }
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => {
            Err("mapping keys must be scalars".to_string())
        }
    }
}

/// Datetimes and non-finite floats become strings.
fn from_toml(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map_or_else(|| Value::String(f.to_string()), Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::List(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => {
            Value::Map(table.into_iter().map(|(k, v)| (k, from_toml(v))).collect())
        }
    }
}

/// Serves namespace `ns` from `{root}/ns.{ext}`, trying each configured
/// extension in order.
#[derive(Debug, Clone)]
pub struct FileLoader {
    name: String,
    root: PathBuf,
    extensions: Vec<(String, FileFormat)>,
    expand_env: bool,
}

impl FileLoader {
    /// `root` may start with `~`.
    #[must_use]
    pub fn new(root: &str) -> Self {
        Self {
            name: "file".to_string(),
            root: PathBuf::from(shellexpand::tilde(root).into_owned()),
            extensions: DEFAULT_EXTENSIONS
                .iter()
                .filter_map(|ext| {
                    FileFormat::from_extension(ext).map(|f| ((*ext).to_string(), f))
                })
                .collect(),
            expand_env: true,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Restrict and order the extensions looked up.
    pub fn with_extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> LoadResult<Self> {
        self.extensions = extensions
            .iter()
            .map(|ext| {
                let ext = ext.as_ref().trim_start_matches('.');
                FileFormat::from_extension(ext)
                    .map(|format| (ext.to_string(), format))
                    .ok_or_else(|| {
                        LoaderError::invalid_config(format!("unsupported extension '{ext}'"))
                    })
            })
            .collect::<LoadResult<_>>()?;
        Ok(self)
    }

    /// Toggle `${VAR}` substitution in file contents.
    #[must_use]
    pub const fn with_env_expansion(mut self, enabled: bool) -> Self {
        self.expand_env = enabled;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, namespace: &str) -> impl Iterator<Item = (PathBuf, FileFormat)> + '_ {
        let namespace = namespace.to_string();
        self.extensions
            .iter()
            .map(move |(ext, format)| (self.root.join(format!("{namespace}.{ext}")), *format))
    }
}

impl Loader for FileLoader {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, namespace: &str) -> LoadResult<Option<Value>> {
        if !is_plain_file_stem(namespace) {
            debug!(namespace, "namespace is not a valid file name");
            return Ok(None);
        }

        for (path, format) in self.candidates(namespace) {
            if !path.is_file() {
                continue;
            }

            let content = std::fs::read_to_string(&path).map_err(|e| LoaderError::Io {
                path: path.clone(),
                source: e,
            })?;
            let content = if self.expand_env {
                expand_env_vars(&content)
            } else {
                content
            };

            debug!(namespace, path = %path.display(), "reading config file");
            return format.parse(&content, &path).map(Some);
        }

        debug!(namespace, root = %self.root.display(), "no config file for namespace");
        Ok(None)
    }
}

fn is_plain_file_stem(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace != "."
        && !namespace.contains("..")
        && !namespace.contains(['/', '\\', '\0'])
}
