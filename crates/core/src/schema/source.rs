use crate::config::{DeserializerConfig, SOURCE_INLINE, SOURCE_REGISTRY};

/// Where the Avro schema governing a batch comes from.
///
/// Classification is total: empty values and unrecognized markers become
/// variants here and turn into errors in the resolver, so callers deal
/// with a single error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// Schema JSON configured directly.
    Inline(String),
    /// Schema fetched from a registry endpoint by subject name.
    Registry { url: String, subject: String },
    /// Unrecognized source marker, kept for diagnostics.
    Unknown(String),
}

impl SchemaSource {
    pub fn classify(config: &DeserializerConfig) -> SchemaSource {
        match config.schema_source.as_deref() {
            None | Some(SOURCE_INLINE) => {
                SchemaSource::Inline(config.schema_text.clone().unwrap_or_default())
            }
            Some(SOURCE_REGISTRY) => SchemaSource::Registry {
                url: config.registry_url.clone().unwrap_or_default(),
                subject: config.registry_subject.clone().unwrap_or_default(),
            },
            Some(other) => SchemaSource::Unknown(other.to_string()),
        }
    }
}
