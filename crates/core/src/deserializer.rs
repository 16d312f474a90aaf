use std::sync::Arc;

use anyhow::anyhow;
use arrow_array::{Array, BinaryArray, RecordBatch};
use arrow_schema::DataType;
use tracing::{debug, instrument};

use avrocol_common::error::{AvrocolError, Result};

use crate::config::{DeserializerConfig, DeserializerOpts};
use crate::decode::avro::AvroDatumDecoder;
use crate::project::project_decoded;
use crate::schema::registry::SchemaRegistryClient;
use crate::schema::resolver::resolve_schema_text;
use crate::schema::source::SchemaSource;

/// The entry point the surrounding engine calls, once per
/// batch/partition: validate the input column, resolve the schema, decode
/// every record, project the result. Any stage failure aborts the call
/// with that stage's error and no partial output.
pub struct AvroColumnDeserializer {
    registry: Arc<dyn SchemaRegistryClient>,
}

impl AvroColumnDeserializer {
    pub fn new(registry: Arc<dyn SchemaRegistryClient>) -> Self {
        Self { registry }
    }

    /// Classifies and resolves the schema text for `opts` without
    /// decoding anything. Callers fanning one batch out to shards resolve
    /// here once and hand the text to [Self::deserialize_with_schema] per
    /// shard, so the registry sees one round-trip per batch.
    pub async fn resolve_schema(&self, opts: &DeserializerOpts) -> Result<String> {
        let config = DeserializerConfig::from_opts(opts);
        let source = SchemaSource::classify(&config);
        resolve_schema_text(&source, self.registry.as_ref()).await
    }

    #[instrument(skip_all, fields(rows = batch.num_rows()))]
    pub async fn deserialize(
        &self,
        batch: &RecordBatch,
        opts: &DeserializerOpts,
    ) -> Result<RecordBatch> {
        let config = DeserializerConfig::from_opts(opts);
        let input_column = config.input_column()?.to_string();
        validate_input_column(batch, &input_column)?;

        let source = SchemaSource::classify(&config);
        let schema_text = resolve_schema_text(&source, self.registry.as_ref()).await?;
        decode_and_project(batch, &input_column, &schema_text)
    }

    /// Decode and project against a pre-resolved schema text; never
    /// touches the registry, so shards of one batch can run this
    /// concurrently against the broadcast text.
    pub fn deserialize_with_schema(
        &self,
        batch: &RecordBatch,
        opts: &DeserializerOpts,
        schema_text: &str,
    ) -> Result<RecordBatch> {
        let config = DeserializerConfig::from_opts(opts);
        let input_column = config.input_column()?.to_string();
        validate_input_column(batch, &input_column)?;
        decode_and_project(batch, &input_column, schema_text)
    }
}

fn validate_input_column(batch: &RecordBatch, name: &str) -> Result<()> {
    match batch.schema().column_with_name(name) {
        None => Err(AvrocolError::Configuration(format!(
            "column to deserialize does not exist: `{name}`"
        ))),
        Some((_, field)) if field.data_type() != &DataType::Binary => {
            Err(AvrocolError::Configuration(format!(
                "column to deserialize `{name}` holds {}, expected binary",
                field.data_type()
            )))
        }
        Some(_) => Ok(()),
    }
}

fn decode_and_project(
    batch: &RecordBatch,
    input_column: &str,
    schema_text: &str,
) -> Result<RecordBatch> {
    let decoder = AvroDatumDecoder::try_new(schema_text)?;
    let array = batch
        .column_by_name(input_column)
        .and_then(|col| col.as_any().downcast_ref::<BinaryArray>())
        .ok_or_else(|| anyhow!("validated input column `{input_column}` is gone"))?;

    let mut blobs = Vec::with_capacity(array.len());
    for row in 0..array.len() {
        if array.is_null(row) {
            return Err(AvrocolError::RecordDecode {
                row,
                reason: "null value in input column".to_string(),
            });
        }
        blobs.push(array.value(row));
    }
    let records = decoder.decode_batch(blobs)?;
    debug!(rows = records.len(), "decoded avro column");

    project_decoded(batch, input_column, decoder.arrow_fields(), &records)
}
