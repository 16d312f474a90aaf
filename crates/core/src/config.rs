use std::collections::HashMap;

use avrocol_common::error::{AvrocolError, Result};

/// String options handed over by the surrounding engine, one map per
/// decode call. Unknown keys are ignored.
pub type DeserializerOpts = HashMap<String, String>;

pub const SCHEMA_SOURCE_KEY: &str = "schema.source";
pub const SCHEMA_TEXT_KEY: &str = "schema.text";
pub const REGISTRY_URL_KEY: &str = "registry.url";
pub const REGISTRY_SUBJECT_KEY: &str = "registry.subject";
pub const INPUT_COLUMN_KEY: &str = "input.column";

pub const SOURCE_INLINE: &str = "inline";
pub const SOURCE_REGISTRY: &str = "registry";

/// The recognized subset of [DeserializerOpts], copied once at entry so
/// the pipeline stages never reach back into the raw map.
///
/// Construction is total: absent and empty values both land as `None`,
/// and each stage reports its own missing-option error.
#[derive(Debug, Clone, Default)]
pub struct DeserializerConfig {
    pub schema_source: Option<String>,
    pub schema_text: Option<String>,
    pub registry_url: Option<String>,
    pub registry_subject: Option<String>,
    pub input_column: Option<String>,
}

impl DeserializerConfig {
    pub fn from_opts(opts: &DeserializerOpts) -> Self {
        let get = |key: &str| opts.get(key).filter(|v| !v.is_empty()).cloned();
        Self {
            schema_source: get(SCHEMA_SOURCE_KEY),
            schema_text: get(SCHEMA_TEXT_KEY),
            registry_url: get(REGISTRY_URL_KEY),
            registry_subject: get(REGISTRY_SUBJECT_KEY),
            input_column: get(INPUT_COLUMN_KEY),
        }
    }

    /// Name of the column holding the binary records. Always required.
    pub fn input_column(&self) -> Result<&str> {
        self.input_column.as_deref().ok_or_else(|| {
            AvrocolError::Configuration(format!("missing option `{INPUT_COLUMN_KEY}`"))
        })
    }
}
