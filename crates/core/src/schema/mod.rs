pub mod registry;
pub mod resolver;
pub mod source;

pub use registry::{CachedRegistry, InMemoryRegistry, RegistryError, SchemaRegistryClient};
pub use resolver::resolve_schema_text;
pub use source::SchemaSource;
