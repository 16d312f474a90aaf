pub mod avro;
pub mod value;

pub use avro::AvroDatumDecoder;
pub use value::{DecodedRecord, FieldValue};
