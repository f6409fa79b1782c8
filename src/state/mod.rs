// src/state/mod.rs
//! Durable record of identifiers already announced, one object per source.

pub mod s3;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

pub use s3::S3ObjectStore;

/// Raw key/value access to the bucket holding state objects.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// `Ok(None)` when the object does not exist.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    /// Replace the object in one write.
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()>;
}

/// Identifiers already reported for one source. Serialized as a sorted JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct KnownSet(BTreeSet<String>);

// Old state objects held full search hits rather than bare identifiers.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Id(String),
    Record { uri: String },
}

impl KnownSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.0.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).context("serialize known set")
    }

    /// Accepts `["id", ...]` and the legacy `[{"uri": "id", ...}, ...]` layout.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let entries: Vec<StoredEntry> =
            serde_json::from_slice(bytes).context("parse known set json")?;
        Ok(entries
            .into_iter()
            .map(|e| match e {
                StoredEntry::Id(id) => id,
                StoredEntry::Record { uri } => uri,
            })
            .collect())
    }
}

impl<S: Into<String>> FromIterator<S> for KnownSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for KnownSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

/// Loads and saves [`KnownSet`]s on top of an [`ObjectStore`].
#[derive(Clone)]
pub struct StateStore {
    backend: Arc<dyn ObjectStore>,
}

impl StateStore {
    pub fn new(backend: Arc<dyn ObjectStore>) -> Self {
        Self { backend }
    }

    /// Empty set when nothing has been stored yet (first run).
    pub async fn load(&self, key: &str) -> Result<KnownSet> {
        match self.backend.get(key).await? {
            None => {
                tracing::info!(key, "no prior state; starting from an empty known set");
                Ok(KnownSet::new())
            }
            Some(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => {
                Err(anyhow!("state object {key} is empty"))
            }
            Some(bytes) => KnownSet::from_json(&bytes).with_context(|| format!("state object {key}")),
        }
    }

    pub async fn save(&self, key: &str, known: &KnownSet) -> Result<()> {
        let body = known.to_json()?;
        self.backend
            .put(key, body)
            .await
            .with_context(|| format!("write state object {key}"))?;
        tracing::debug!(key, known = known.len(), "state saved");
        Ok(())
    }
}

/// In-process store for tests and local dry runs.
#[derive(Default)]
pub struct MemoryObjectStore {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub puts: Mutex<Vec<String>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, key: &str, body: impl Into<Vec<u8>>) -> Self {
        self.objects
            .lock()
            .expect("memory store mutex poisoned")
            .insert(key.to_string(), body.into());
        self
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .expect("memory store mutex poisoned")
            .get(key)
            .cloned()
    }

    pub fn put_count(&self) -> usize {
        self.puts.lock().expect("memory store mutex poisoned").len()
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.object(key))
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        self.objects
            .lock()
            .expect("memory store mutex poisoned")
            .insert(key.to_string(), body);
        self.puts
            .lock()
            .expect("memory store mutex poisoned")
            .push(key.to_string());
        Ok(())
    }
}
