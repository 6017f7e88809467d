//! Key grammar.
//!
//! A key names a namespace and, optionally, a path inside it:
//!
//! - `database`: the whole `database` namespace
//! - `database.connections.default.host`: dotted path, split on `.`
//! - `database#connections.default`: literal path, looked up as one
//!   segment so keys that contain dots can still be reached
//!
//! The literal form wins whenever the text before the first `#` is
//! non-empty. A key starting with `#` is read in dotted form.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid key: {0:?}")]
    InvalidKey(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPath<'a> {
    Dotted(&'a str),
    Literal(&'a str),
}

impl<'a> KeyPath<'a> {
    #[must_use]
    pub const fn as_str(&self) -> &'a str {
        match *self {
            Self::Dotted(path) | Self::Literal(path) => path,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    /// Segments to descend through, in order. Empty dotted segments are
    /// dropped so `a..b` and `a.` behave like `a.b` and `a`.
    pub fn segments(&self) -> impl Iterator<Item = &'a str> {
        let (dotted, literal) = match *self {
            Self::Dotted(path) => (Some(path), None),
            Self::Literal(path) => (None, Some(path).filter(|p| !p.is_empty())),
        };
        dotted
            .into_iter()
            .flat_map(|path| path.split('.'))
            .filter(|segment| !segment.is_empty())
            .chain(literal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedKey<'a> {
    pub namespace: &'a str,
    pub path: KeyPath<'a>,
}

pub struct KeyParser;

impl KeyParser {
    pub fn parse(key: &str) -> Result<ParsedKey<'_>, ParseError> {
        if let Some((namespace, literal)) = key.split_once('#') {
            if !namespace.is_empty() {
                return Ok(ParsedKey {
                    namespace,
                    path: KeyPath::Literal(literal),
                });
            }
        }

        let (namespace, dotted) = key.split_once('.').unwrap_or((key, ""));
        if namespace.is_empty() {
            return Err(ParseError::InvalidKey(key.to_string()));
        }

        Ok(ParsedKey {
            namespace,
            path: KeyPath::Dotted(dotted),
        })
    }
}
