use tracing::debug;

use avrocol_common::error::{AvrocolError, Result};

use crate::config::{REGISTRY_SUBJECT_KEY, REGISTRY_URL_KEY, SCHEMA_TEXT_KEY};

use super::registry::SchemaRegistryClient;
use super::source::SchemaSource;

/// Turns a classified schema source into schema text.
///
/// At most one registry round-trip, no caching, no retries; callers that
/// decode many batches against one subject wrap their client in
/// [super::registry::CachedRegistry].
pub async fn resolve_schema_text(
    source: &SchemaSource,
    registry: &dyn SchemaRegistryClient,
) -> Result<String> {
    match source {
        SchemaSource::Inline(text) => {
            if text.is_empty() {
                return Err(AvrocolError::Configuration(format!(
                    "missing inline schema: set the `{SCHEMA_TEXT_KEY}` option"
                )));
            }
            Ok(text.clone())
        }
        SchemaSource::Registry { url, subject } => {
            if url.is_empty() {
                return Err(AvrocolError::Configuration(format!(
                    "missing registry url: set the `{REGISTRY_URL_KEY}` option"
                )));
            }
            if subject.is_empty() {
                return Err(AvrocolError::Configuration(format!(
                    "missing subject: set the `{REGISTRY_SUBJECT_KEY}` option"
                )));
            }
            let schema = registry
                .resolve(url, subject)
                .await
                .map_err(|e| AvrocolError::SchemaLookup(e.to_string()))?;
            debug!(%subject, "resolved schema from registry");
            Ok(schema)
        }
        SchemaSource::Unknown(kind) => Err(AvrocolError::Configuration(format!(
            "unknown schema source `{kind}`, expected `inline` or `registry`"
        ))),
    }
}
