use std::result;
use thiserror::Error;

use arrow::error::ArrowError;
use serde_json::Error as JsonError;

/// Result type for operations that could result in an [AvrocolError]
pub type Result<T, E = AvrocolError> = result::Result<T, E>;

/// Avrocol Error
///
/// Every pipeline stage surfaces exactly one of these kinds; nothing is
/// retried or swallowed below the caller.
#[derive(Error, Debug)]
pub enum AvrocolError {
    /// Missing, empty, or contradictory configuration. The message names
    /// the offending key, column, or value.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// The schema registry collaborator failed; retry policy belongs to
    /// the caller.
    #[error("schema lookup failed: {0}")]
    SchemaLookup(String),
    /// Schema text is not a usable Avro record schema. Fatal for the
    /// batch, since every row shares the schema.
    #[error("invalid Avro schema: {0}")]
    SchemaParse(String),
    /// One row's bytes do not conform to the resolved schema. Fatal for
    /// the batch; no partial output is returned.
    #[error("cannot decode Avro record at row {row}: {reason}")]
    RecordDecode { row: usize, reason: String },
    #[error("Arrow Error")]
    Arrow(#[from] ArrowError),
    #[error("Json Error")]
    Json(#[from] JsonError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
