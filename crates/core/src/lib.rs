pub mod config;
pub mod decode;
pub mod deserializer;
pub mod project;
pub mod schema;

pub use avrocol_common::error::{AvrocolError, Result};
pub use deserializer::AvroColumnDeserializer;
