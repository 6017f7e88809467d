#![allow(missing_docs)]

pub mod error;
pub mod key;
pub mod loaders;
pub mod store;

pub use strata_sdk;
pub use strata_sdk::{LoadResult, Loader, LoaderConfig, LoaderError, Map, Value};

pub use error::{StoreError, StoreResult};
pub use key::{KeyParser, KeyPath, ParseError, ParsedKey};
pub use loaders::{
    default_registry, FileFormat, FileLoader, LoaderFactory, LoaderRegistry, MemoryLoader,
};
pub use store::{ConfigStore, LoaderFailurePolicy};
