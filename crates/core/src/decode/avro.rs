use std::io::Cursor;

use apache_avro::schema::RecordSchema;
use apache_avro::types::Value;
use apache_avro::{from_avro_datum, Schema as AvroSchema};
use arrow_schema::{DataType, Field, Fields};

use avrocol_common::error::{AvrocolError, Result};

use super::value::{DecodedRecord, FieldValue};

/// Decodes single-datum Avro binary (no container-file framing) against
/// one schema. The schema text is parsed once per batch; every row in the
/// batch decodes against the same parsed schema.
#[derive(Debug)]
pub struct AvroDatumDecoder {
    schema: AvroSchema,
    fields: Fields,
}

impl AvroDatumDecoder {
    /// Parses and validates the schema text. Only flat record schemas
    /// with primitive field types decode here; anything else is rejected
    /// up front so a bad schema aborts the batch before any row is read.
    pub fn try_new(schema_text: &str) -> Result<Self> {
        let schema = AvroSchema::parse_str(schema_text)
            .map_err(|e| AvrocolError::SchemaParse(e.to_string()))?;
        let fields = record_fields(&schema)?;
        Ok(Self { schema, fields })
    }

    /// Arrow fields for the decoded columns, in schema-declaration order.
    pub fn arrow_fields(&self) -> &Fields {
        &self.fields
    }

    /// Decodes one datum. `row` feeds error diagnostics only.
    pub fn decode(&self, bytes: &[u8], row: usize) -> Result<DecodedRecord> {
        let mut reader = Cursor::new(bytes);
        let value = from_avro_datum(&self.schema, &mut reader, None)
            .map_err(|e| decode_error(row, e.to_string()))?;
        let consumed = reader.position() as usize;
        if consumed < bytes.len() {
            return Err(decode_error(
                row,
                format!("{} trailing bytes after datum", bytes.len() - consumed),
            ));
        }
        let entries = match value {
            Value::Record(entries) => entries,
            other => {
                return Err(decode_error(
                    row,
                    format!("expected a record value, decoded {other:?}"),
                ))
            }
        };
        if entries.len() != self.fields.len() {
            return Err(decode_error(
                row,
                format!(
                    "decoded {} fields, schema declares {}",
                    entries.len(),
                    self.fields.len()
                ),
            ));
        }
        let mut fields = Vec::with_capacity(entries.len());
        for (name, value) in entries {
            let value = field_value(value).map_err(|reason| decode_error(row, reason))?;
            fields.push((name, value));
        }
        Ok(DecodedRecord::new(fields))
    }

    /// All-or-nothing batch decode: the first failing row aborts the
    /// whole batch with that row's index and no partial output escapes.
    pub fn decode_batch<'a, I>(&self, blobs: I) -> Result<Vec<DecodedRecord>>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        blobs
            .into_iter()
            .enumerate()
            .map(|(row, bytes)| self.decode(bytes, row))
            .collect()
    }
}

fn decode_error(row: usize, reason: String) -> AvrocolError {
    AvrocolError::RecordDecode { row, reason }
}

/// Maps the record's primitive field types onto Arrow fields, in
/// declaration order. Composite and logical types are not part of the
/// decode contract and are rejected by name.
fn record_fields(schema: &AvroSchema) -> Result<Fields> {
    let record = match schema {
        AvroSchema::Record(RecordSchema { fields, .. }) => fields,
        _ => {
            return Err(AvrocolError::SchemaParse(
                "expected a record schema at the top level".to_string(),
            ))
        }
    };
    let mut out = Vec::with_capacity(record.len());
    for field in record {
        let data_type = match &field.schema {
            AvroSchema::Boolean => DataType::Boolean,
            AvroSchema::Int => DataType::Int32,
            AvroSchema::Long => DataType::Int64,
            AvroSchema::Float => DataType::Float32,
            AvroSchema::Double => DataType::Float64,
            AvroSchema::Bytes => DataType::Binary,
            AvroSchema::String => DataType::Utf8,
            other => {
                return Err(AvrocolError::SchemaParse(format!(
                    "unsupported type for field `{}`: {:?}",
                    field.name, other
                )))
            }
        };
        out.push(Field::new(&field.name, data_type, false));
    }
    Ok(Fields::from(out))
}

fn field_value(value: Value) -> std::result::Result<FieldValue, String> {
    match value {
        Value::Boolean(v) => Ok(FieldValue::Boolean(v)),
        Value::Int(v) => Ok(FieldValue::Int(v)),
        Value::Long(v) => Ok(FieldValue::Long(v)),
        Value::Float(v) => Ok(FieldValue::Float(v)),
        Value::Double(v) => Ok(FieldValue::Double(v)),
        Value::Bytes(v) => Ok(FieldValue::Bytes(v)),
        Value::String(v) => Ok(FieldValue::String(v)),
        other => Err(format!("unsupported value {other:?}")),
    }
}
