use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

/// Failure reported by a registry backend. The resolver surfaces these as
/// schema-lookup errors; whether to retry is the caller's decision.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("unknown subject `{0}`")]
    UnknownSubject(String),
    #[error("registry transport error: {0}")]
    Transport(String),
    #[error("malformed registry response: {0}")]
    MalformedResponse(String),
}

/// Schema registry collaborator: maps a subject name to schema text.
///
/// Network transport, timeouts, and retry policy all live behind this
/// trait; the decode pipeline performs exactly one `resolve` per batch.
#[async_trait]
pub trait SchemaRegistryClient: Send + Sync {
    async fn resolve(&self, url: &str, subject: &str) -> Result<String, RegistryError>;
}

/// Subject → schema map. The dev and test backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    subjects: HashMap<String, String>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, subject: impl Into<String>, schema: impl Into<String>) -> Self {
        self.subjects.insert(subject.into(), schema.into());
        self
    }

    /// Loads a JSON object mapping subject names to schema text, e.g.
    /// `{"events-value": "{\"type\": \"record\", ...}"}`.
    pub fn from_json(fixture: &str) -> avrocol_common::Result<Self> {
        let subjects: HashMap<String, String> = serde_json::from_str(fixture)?;
        Ok(Self { subjects })
    }
}

#[async_trait]
impl SchemaRegistryClient for InMemoryRegistry {
    async fn resolve(&self, _url: &str, subject: &str) -> Result<String, RegistryError> {
        self.subjects
            .get(subject)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownSubject(subject.to_string()))
    }
}

/// Memoizes successful lookups by `(url, subject)`.
///
/// Wrap the network client in this when many batches decode against the
/// same subject. Failures are not cached, so a transient registry outage
/// stays retryable on the next batch.
pub struct CachedRegistry<C> {
    inner: C,
    cache: Mutex<HashMap<(String, String), String>>,
}

impl<C> CachedRegistry<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<C: SchemaRegistryClient> SchemaRegistryClient for CachedRegistry<C> {
    async fn resolve(&self, url: &str, subject: &str) -> Result<String, RegistryError> {
        let key = (url.to_string(), subject.to_string());
        if let Some(hit) = self.cache.lock().await.get(&key) {
            return Ok(hit.clone());
        }
        let schema = self.inner.resolve(url, subject).await?;
        self.cache.lock().await.insert(key, schema.clone());
        Ok(schema)
    }
}
