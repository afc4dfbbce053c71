use crate::error::{GalleryError, Result};
use crate::id_set::IdSet;
use crate::settings::{SettingKey, Settings};
use crate::store::KeyValueStore;
use log::{debug, error, warn};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// A key the gallery writes to the external store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Setting(SettingKey),
    Watched,
    Favorites,
}

impl StorageKey {
    pub fn all() -> Vec<StorageKey> {
        SettingKey::ALL
            .into_iter()
            .map(StorageKey::Setting)
            .chain([StorageKey::Watched, StorageKey::Favorites])
            .collect()
    }

    /// `setting` followed by the capitalised field name, e.g. `settingImageSet`.
    pub fn storage_name(&self) -> String {
        let field = match self {
            StorageKey::Setting(key) => key.field_name(),
            StorageKey::Watched => "watched",
            StorageKey::Favorites => "favorites",
        };
        let mut chars = field.chars();
        match chars.next() {
            Some(first) => format!("setting{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => "setting".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedState {
    pub settings: Settings,
    pub watched: IdSet,
    pub favorites: IdSet,
}

pub struct PersistenceAdapter<S> {
    store: Arc<S>,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// One batched read of every known key. A failed read yields defaults; a
    /// malformed value only resets its own field.
    pub async fn load_all(&self) -> LoadedState {
        let names: Vec<String> = StorageKey::all().iter().map(|k| k.storage_name()).collect();
        let keys: Vec<&str> = names.iter().map(String::as_str).collect();

        let stored = match self.store.get(&keys).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Failed to read persisted state, using defaults: {e}");
                return LoadedState::default();
            }
        };

        let mut fields = Map::new();
        for key in SettingKey::ALL {
            if let Some(value) = stored.get(&StorageKey::Setting(key).storage_name()) {
                fields.insert(key.field_name().to_string(), value.clone());
            }
        }

        LoadedState {
            settings: Settings::normalize(&fields),
            watched: id_set_from(&stored, StorageKey::Watched),
            favorites: id_set_from(&stored, StorageKey::Favorites),
        }
    }

    pub async fn save_field(&self, key: StorageKey, value: Value) -> Result<()> {
        self.store.set(&key.storage_name(), value).await
    }
}

fn id_set_from(stored: &Map<String, Value>, key: StorageKey) -> IdSet {
    match stored.get(&key.storage_name()) {
        None | Some(Value::Null) => IdSet::new(),
        Some(Value::String(raw)) => IdSet::parse(raw),
        Some(other) => {
            warn!(
                "Ignoring malformed value for {}: {other}",
                key.storage_name()
            );
            IdSet::new()
        }
    }
}

pub fn serialize_ids(ids: &IdSet) -> Value {
    Value::String(ids.to_storage_string())
}

struct WriteRequest {
    key: StorageKey,
    value: Value,
    done: oneshot::Sender<Result<()>>,
}

/// Outcome of one queued write. Awaiting it is optional.
#[derive(Debug)]
pub struct PendingWrite {
    key: StorageKey,
    receiver: oneshot::Receiver<Result<()>>,
}

impl PendingWrite {
    pub fn key(&self) -> StorageKey {
        self.key
    }

    /// Resolves once the store accepted or rejected the write.
    pub async fn wait(self) -> Result<()> {
        self.receiver
            .await
            .unwrap_or(Err(GalleryError::WriteAbandoned))
    }
}

/// Single writer task: writes reach the store in the order they were queued.
#[derive(Clone)]
pub struct WriteQueue {
    sender: mpsc::UnboundedSender<WriteRequest>,
}

impl WriteQueue {
    /// Must be called from within a tokio runtime.
    pub fn spawn<S: KeyValueStore>(adapter: Arc<PersistenceAdapter<S>>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<WriteRequest>();

        tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let name = request.key.storage_name();
                let result = adapter.save_field(request.key, request.value).await;
                match &result {
                    Ok(()) => debug!("Persisted {name}"),
                    Err(e) => error!("Failed to persist {name}: {e}"),
                }
                let _ = request.done.send(result);
            }
            debug!("Persistence writer stopped");
        });

        Self { sender }
    }

    pub fn enqueue(&self, key: StorageKey, value: Value) -> PendingWrite {
        let (done, receiver) = oneshot::channel();
        if self
            .sender
            .send(WriteRequest { key, value, done })
            .is_err()
        {
            warn!("Persistence writer is gone, dropping write of {}", key.storage_name());
        }
        PendingWrite { key, receiver }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Filter, ImageSet};
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn storage_names_follow_setting_prefix_convention() {
        assert_eq!(
            StorageKey::Setting(SettingKey::ImageSet).storage_name(),
            "settingImageSet"
        );
        assert_eq!(
            StorageKey::Setting(SettingKey::DisplayWatchedRecords).storage_name(),
            "settingDisplayWatchedRecords"
        );
        assert_eq!(StorageKey::Watched.storage_name(), "settingWatched");
        assert_eq!(StorageKey::Favorites.storage_name(), "settingFavorites");
        assert_eq!(StorageKey::all().len(), 10);
    }

    #[tokio::test]
    async fn load_all_tolerates_partial_corruption() {
        let store = MemoryStore::with_values([
            ("settingImageSet", json!("themed")),
            ("settingFilter", json!({"nested": true})),
            ("settingWatched", json!("4,,4,9")),
            ("settingFavorites", json!(12)),
        ]);
        let adapter = PersistenceAdapter::new(Arc::new(store));

        let loaded = adapter.load_all().await;
        assert_eq!(loaded.settings.image_set, ImageSet::Themed);
        assert_eq!(loaded.settings.filter, Filter::All);
        assert_eq!(loaded.watched.to_storage_string(), "4,9");
        assert!(loaded.favorites.is_empty());
    }

    #[tokio::test]
    async fn failed_read_falls_back_to_defaults() {
        let store = MemoryStore::with_values([("settingSort", json!("date-asc"))]);
        store.fail_reads(true);
        let adapter = PersistenceAdapter::new(Arc::new(store));

        assert_eq!(adapter.load_all().await, LoadedState::default());
    }

    #[tokio::test]
    async fn queued_writes_land_in_order_and_report_failures() {
        let store = MemoryStore::new();
        let adapter = Arc::new(PersistenceAdapter::new(Arc::new(store.clone())));
        let queue = WriteQueue::spawn(adapter);

        let first = queue.enqueue(StorageKey::Watched, json!("1"));
        let second = queue.enqueue(StorageKey::Watched, json!("1,2"));
        first.wait().await.unwrap();
        second.wait().await.unwrap();
        assert_eq!(store.value("settingWatched"), Some(json!("1,2")));

        store.fail_writes(true);
        let failed = queue.enqueue(StorageKey::Favorites, json!("3"));
        assert!(matches!(failed.wait().await, Err(GalleryError::Store(_))));
        assert_eq!(store.writes().len(), 2);
    }
}
