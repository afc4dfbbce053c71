//! Key-value stores the gallery persists into.
//!
//! The host platform's synced storage is modelled by [`KeyValueStore`]: a
//! batched asynchronous read and a single-key asynchronous write. Durability
//! and cross-device sync belong to the implementation.

use crate::error::{GalleryError, Result};
use log::warn;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the stored values for the requested keys; absent keys are
    /// simply missing from the map.
    fn get(&self, keys: &[&str]) -> impl Future<Output = Result<Map<String, Value>>> + Send;

    fn set(&self, key: &str, value: Value) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Default)]
struct MemoryInner {
    values: HashMap<String, Value>,
    writes: Vec<(String, Value)>,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-process store. Clones share the same contents.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            inner.values = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
        }
        store
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        if let Ok(inner) = self.inner.lock() {
            inner.values.get(key).cloned()
        } else {
            None
        }
    }

    /// Every successful write, in the order the store received them.
    pub fn writes(&self) -> Vec<(String, Value)> {
        if let Ok(inner) = self.inner.lock() {
            inner.writes.clone()
        } else {
            Vec::new()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_reads = fail;
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_writes = fail;
        }
    }

    fn read(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| GalleryError::Store("memory store poisoned".to_string()))?;
        if inner.fail_reads {
            return Err(GalleryError::Store("read rejected".to_string()));
        }
        Ok(keys
            .iter()
            .filter_map(|key| {
                inner
                    .values
                    .get(*key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect())
    }

    fn write(&self, key: &str, value: Value) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| GalleryError::Store("memory store poisoned".to_string()))?;
        if inner.fail_writes {
            return Err(GalleryError::Store("quota exceeded".to_string()));
        }
        inner.writes.push((key.to_string(), value.clone()));
        inner.values.insert(key.to_string(), value);
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> impl Future<Output = Result<Map<String, Value>>> + Send {
        let result = self.read(keys);
        async move { result }
    }

    fn set(&self, key: &str, value: Value) -> impl Future<Output = Result<()>> + Send {
        let result = self.write(key, value);
        async move { result }
    }
}

/// Store backed by a single JSON object on disk.
pub struct JsonFileStore {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Map<String, Value>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(GalleryError::Store(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(GalleryError::Store(format!(
                "{} is not valid JSON: {e}",
                self.path.display()
            ))),
        }
    }

    /// Like `read_all`, but a corrupt file is moved aside and replaced so that
    /// later writes can still land.
    async fn read_for_update(&self) -> Result<Map<String, Value>> {
        match self.read_all().await {
            Err(GalleryError::Store(reason)) => {
                let backup = with_suffix(&self.path, "corrupt");
                warn!("{reason}, moving it to {}", backup.display());
                if let Err(e) = tokio::fs::rename(&self.path, &backup).await {
                    warn!("Could not move {} aside: {e}", self.path.display());
                }
                Ok(Map::new())
            }
            other => other,
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, keys: &[&str]) -> impl Future<Output = Result<Map<String, Value>>> + Send {
        let keys: Vec<String> = keys.iter().map(|key| key.to_string()).collect();
        async move {
            let _guard = self.lock.lock().await;
            let all = self.read_all().await?;
            Ok(keys
                .into_iter()
                .filter_map(|key| all.get(&key).cloned().map(|value| (key, value)))
                .collect())
        }
    }

    fn set(&self, key: &str, value: Value) -> impl Future<Output = Result<()>> + Send {
        let key = key.to_string();
        async move {
            let _guard = self.lock.lock().await;
            let mut all = self.read_for_update().await?;
            all.insert(key, value);
            let contents = serde_json::to_string_pretty(&Value::Object(all))?;
            // write-then-rename keeps the old file intact if writing fails
            let staged = with_suffix(&self.path, "tmp");
            tokio::fs::write(&staged, contents).await?;
            tokio::fs::rename(&staged, &self.path).await?;
            Ok(())
        }
    }
}
