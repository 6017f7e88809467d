use strata_sdk::LoaderError;
use thiserror::Error;

use crate::key::ParseError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    InvalidKey(#[from] ParseError),

    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    #[error("loader '{loader}' failed: {source}")]
    Loader { loader: String, source: LoaderError },

    #[error("value at {key} cannot be converted: {message}")]
    Conversion { key: String, message: String },
}

impl StoreError {
    #[must_use]
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }

    #[must_use]
    pub const fn is_invalid_key(&self) -> bool {
        matches!(self, Self::InvalidKey(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::key_not_found("database.host");
        assert_eq!(err.to_string(), "key not found: database.host");

        let err = StoreError::from(ParseError::InvalidKey(String::new()));
        assert_eq!(err.to_string(), r#"invalid key: """#);

        let err = StoreError::Loader {
            loader: "secrets".to_string(),
            source: LoaderError::backend("connection refused"),
        };
        assert_eq!(
            err.to_string(),
            "loader 'secrets' failed: backend unavailable: connection refused"
        );
    }

    #[test]
    fn error_predicates() {
        assert!(StoreError::key_not_found("a").is_not_found());
        assert!(!StoreError::key_not_found("a").is_invalid_key());
        assert!(StoreError::from(ParseError::InvalidKey(".".into())).is_invalid_key());
    }
}
