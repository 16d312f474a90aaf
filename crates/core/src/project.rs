use std::sync::Arc;

use anyhow::anyhow;
use arrow_array::builder::{
    BinaryBuilder, BooleanBuilder, Float32Builder, Float64Builder, Int32Builder, Int64Builder,
    StringBuilder,
};
use arrow_array::{ArrayRef, RecordBatch, RecordBatchOptions};
use arrow_schema::{DataType, Field, FieldRef, Fields, Schema};

use avrocol_common::error::{AvrocolError, Result};

use crate::decode::value::{DecodedRecord, FieldValue};

/// Replaces the binary input column with one typed column per decoded
/// field. Surviving columns keep their relative order; decoded columns
/// are appended in schema-declaration order.
pub fn project_decoded(
    batch: &RecordBatch,
    input_column: &str,
    fields: &Fields,
    records: &[DecodedRecord],
) -> Result<RecordBatch> {
    let schema = batch.schema();
    let input_index = schema.index_of(input_column).map_err(|_| {
        AvrocolError::Configuration(format!(
            "column to deserialize does not exist: `{input_column}`"
        ))
    })?;

    // One decoded record per row is the decoder's contract.
    assert_eq!(
        records.len(),
        batch.num_rows(),
        "decoded record count must match row count"
    );

    for field in fields {
        if field.name() != input_column && schema.column_with_name(field.name()).is_some() {
            return Err(AvrocolError::Configuration(format!(
                "decoded field collides with existing column `{}`",
                field.name()
            )));
        }
    }

    let mut out_fields: Vec<FieldRef> = Vec::with_capacity(schema.fields().len() + fields.len());
    let mut out_columns: Vec<ArrayRef> = Vec::with_capacity(out_fields.capacity());
    for (i, field) in schema.fields().iter().enumerate() {
        if i == input_index {
            continue;
        }
        out_fields.push(field.clone());
        out_columns.push(batch.column(i).clone());
    }
    for (i, field) in fields.iter().enumerate() {
        out_fields.push(field.clone());
        out_columns.push(build_column(field, i, records)?);
    }

    let out_schema = Arc::new(Schema::new(Fields::from(out_fields)));
    let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
    Ok(RecordBatch::try_new_with_options(
        out_schema,
        out_columns,
        &options,
    )?)
}

fn build_column(field: &Field, index: usize, records: &[DecodedRecord]) -> Result<ArrayRef> {
    let mismatch = |row: usize| {
        AvrocolError::Other(anyhow!(
            "decoded value for field `{}` at row {row} does not match its declared type",
            field.name()
        ))
    };
    let array: ArrayRef = match field.data_type() {
        DataType::Boolean => {
            let mut builder = BooleanBuilder::new();
            for (row, record) in records.iter().enumerate() {
                match record.value(index) {
                    Some(FieldValue::Boolean(v)) => builder.append_value(*v),
                    _ => return Err(mismatch(row)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Int32 => {
            let mut builder = Int32Builder::new();
            for (row, record) in records.iter().enumerate() {
                match record.value(index) {
                    Some(FieldValue::Int(v)) => builder.append_value(*v),
                    _ => return Err(mismatch(row)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Int64 => {
            let mut builder = Int64Builder::new();
            for (row, record) in records.iter().enumerate() {
                match record.value(index) {
                    Some(FieldValue::Long(v)) => builder.append_value(*v),
                    _ => return Err(mismatch(row)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Float32 => {
            let mut builder = Float32Builder::new();
            for (row, record) in records.iter().enumerate() {
                match record.value(index) {
                    Some(FieldValue::Float(v)) => builder.append_value(*v),
                    _ => return Err(mismatch(row)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Float64 => {
            let mut builder = Float64Builder::new();
            for (row, record) in records.iter().enumerate() {
                match record.value(index) {
                    Some(FieldValue::Double(v)) => builder.append_value(*v),
                    _ => return Err(mismatch(row)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Binary => {
            let mut builder = BinaryBuilder::new();
            for (row, record) in records.iter().enumerate() {
                match record.value(index) {
                    Some(FieldValue::Bytes(v)) => builder.append_value(v),
                    _ => return Err(mismatch(row)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Utf8 => {
            let mut builder = StringBuilder::new();
            for (row, record) in records.iter().enumerate() {
                match record.value(index) {
                    Some(FieldValue::String(v)) => builder.append_value(v),
                    _ => return Err(mismatch(row)),
                }
            }
            Arc::new(builder.finish())
        }
        other => {
            return Err(AvrocolError::Other(anyhow!(
                "unexpected projected column type {other} for field `{}`",
                field.name()
            )))
        }
    };
    Ok(array)
}

#[cfg(test)]
mod tests {
    use arrow_array::{BinaryArray, Int32Array, StringArray};

    use super::*;

    fn test_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("source", DataType::Utf8, false),
            Field::new("payload", DataType::Binary, false),
            Field::new("offset", DataType::Int32, false),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["a", "b"])),
                Arc::new(BinaryArray::from(vec![&[1u8][..], &[2u8][..]])),
                Arc::new(Int32Array::from(vec![10, 20])),
            ],
        )
        .unwrap()
    }

    fn decoded_fields() -> Fields {
        Fields::from(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("name", DataType::Utf8, false),
        ])
    }

    fn decoded_records() -> Vec<DecodedRecord> {
        vec![
            DecodedRecord::new(vec![
                ("id".to_string(), FieldValue::Long(1)),
                ("name".to_string(), FieldValue::String("alice".to_string())),
            ]),
            DecodedRecord::new(vec![
                ("id".to_string(), FieldValue::Long(2)),
                ("name".to_string(), FieldValue::String("bob".to_string())),
            ]),
        ]
    }

    #[test]
    fn input_column_is_replaced_and_order_is_stable() {
        let batch = test_batch();
        let out =
            project_decoded(&batch, "payload", &decoded_fields(), &decoded_records()).unwrap();

        let names: Vec<_> = out
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(names, vec!["source", "offset", "id", "name"]);
        assert_eq!(out.num_rows(), 2);

        let source = out
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(source.value(0), "a");
        assert_eq!(source.value(1), "b");

        let ids = out
            .column(2)
            .as_any()
            .downcast_ref::<arrow_array::Int64Array>()
            .unwrap();
        assert_eq!(ids.value(0), 1);
        assert_eq!(ids.value(1), 2);
    }

    #[test]
    fn missing_input_column_names_it() {
        let batch = test_batch();
        let err =
            project_decoded(&batch, "missing", &decoded_fields(), &decoded_records()).unwrap_err();
        assert!(matches!(err, AvrocolError::Configuration(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn colliding_field_name_is_a_configuration_error() {
        let batch = test_batch();
        let fields = Fields::from(vec![Field::new("offset", DataType::Int64, false)]);
        let records = vec![
            DecodedRecord::new(vec![("offset".to_string(), FieldValue::Long(1))]),
            DecodedRecord::new(vec![("offset".to_string(), FieldValue::Long(2))]),
        ];
        let err = project_decoded(&batch, "payload", &fields, &records).unwrap_err();
        assert!(matches!(err, AvrocolError::Configuration(_)));
        assert!(err.to_string().contains("offset"));
    }

    #[test]
    fn decoded_field_may_reuse_the_consumed_column_name() {
        let batch = test_batch();
        let fields = Fields::from(vec![Field::new("payload", DataType::Int64, false)]);
        let records = vec![
            DecodedRecord::new(vec![("payload".to_string(), FieldValue::Long(1))]),
            DecodedRecord::new(vec![("payload".to_string(), FieldValue::Long(2))]),
        ];
        let out = project_decoded(&batch, "payload", &fields, &records).unwrap();
        let names: Vec<_> = out
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(names, vec!["source", "offset", "payload"]);
    }

    #[test]
    #[should_panic(expected = "decoded record count must match row count")]
    fn record_count_mismatch_is_fatal() {
        let batch = test_batch();
        let records = vec![DecodedRecord::new(vec![
            ("id".to_string(), FieldValue::Long(1)),
            ("name".to_string(), FieldValue::String("alice".to_string())),
        ])];
        let _ = project_decoded(&batch, "payload", &decoded_fields(), &records);
    }

    #[test]
    fn mistyped_value_is_an_internal_error() {
        let batch = test_batch();
        let fields = Fields::from(vec![Field::new("id", DataType::Int64, false)]);
        let records = vec![
            DecodedRecord::new(vec![("id".to_string(), FieldValue::Long(1))]),
            DecodedRecord::new(vec![(
                "id".to_string(),
                FieldValue::String("oops".to_string()),
            )]),
        ];
        let err = project_decoded(&batch, "payload", &fields, &records).unwrap_err();
        assert!(matches!(err, AvrocolError::Other(_)));
    }
}
