use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {source_name}: {message}")]
    Parse { source_name: String, message: String },

    #[error("backend unavailable: {0}")]
    Backend(String),

    #[error("invalid loader config: {0}")]
    InvalidConfig(String),

    #[error("loader '{0}' not registered")]
    NotRegistered(String),
}

impl LoaderError {
    #[must_use]
    pub fn parse(source_name: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend(reason.into())
    }

    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    #[must_use]
    pub fn not_registered(name: impl Into<String>) -> Self {
        Self::NotRegistered(name.into())
    }

    /// Errors raised while talking to a backing store, as opposed to
    /// errors in how the loader was configured.
    #[must_use]
    pub const fn is_backend(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Parse { .. } | Self::Backend(_))
    }
}

pub type LoadResult<T> = Result<T, LoaderError>;
