#![doc = include_str!("../README.md")]

mod config;
mod env;
mod error;
mod loader;
mod value;

pub use config::LoaderConfig;
pub use env::expand_env_vars;
pub use error::{LoadResult, LoaderError};
pub use loader::Loader;
pub use value::{Map, Value};
