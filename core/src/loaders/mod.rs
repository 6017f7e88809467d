pub mod file;
pub mod memory;
pub mod registry;

pub use file::{FileFormat, FileLoader};
pub use memory::MemoryLoader;
pub use registry::{default_registry, LoaderFactory, LoaderRegistry};
