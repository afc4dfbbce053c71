//! Application state: settings, watched and favorite sets and the search
//! query, held in one observable container and persisted on every change.

use crate::config::GalleryConfig;
use crate::debounce::Debouncer;
use crate::deep_link;
use crate::error::{GalleryError, Result};
use crate::id_set::IdSet;
use crate::models::{DisplayItem, VideoRecord};
use crate::persistence::{serialize_ids, PendingWrite, PersistenceAdapter, StorageKey, WriteQueue};
use crate::pipeline::{self, LanguagePreference, LocalizedRecord, ViewQuery};
use crate::settings::{Settings, SettingsPatch};
use crate::store::KeyValueStore;
use crate::transfer;
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryState {
    pub settings: Settings,
    pub watched: IdSet,
    pub favorites: IdSet,
    pub search_query: String,
}

pub struct Gallery {
    records: Arc<Vec<VideoRecord>>,
    config: GalleryConfig,
    state: Arc<watch::Sender<GalleryState>>,
    writes: WriteQueue,
}

impl Gallery {
    /// Reads persisted state, then makes the records available. Nothing here
    /// fails: unreadable values fall back to their defaults.
    pub async fn load<S: KeyValueStore>(
        store: Arc<S>,
        records: Vec<VideoRecord>,
        config: GalleryConfig,
    ) -> Self {
        let adapter = Arc::new(PersistenceAdapter::new(store));
        let loaded = adapter.load_all().await;
        info!(
            "Loaded {} records, {} watched, {} favorites",
            records.len(),
            loaded.watched.len(),
            loaded.favorites.len()
        );

        let (state, _) = watch::channel(GalleryState {
            settings: loaded.settings,
            watched: loaded.watched,
            favorites: loaded.favorites,
            search_query: String::new(),
        });

        Self {
            records: Arc::new(records),
            config,
            state: Arc::new(state),
            writes: WriteQueue::spawn(adapter),
        }
    }

    pub fn records(&self) -> &[VideoRecord] {
        &self.records
    }

    pub fn snapshot(&self) -> GalleryState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GalleryState> {
        self.state.subscribe()
    }

    pub fn find_record(&self, id: &str) -> Option<&VideoRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn is_watched(&self, id: &str) -> bool {
        self.state.borrow().watched.contains(id)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.state.borrow().favorites.contains(id)
    }

    pub fn watched_count(&self) -> usize {
        self.state.borrow().watched.len()
    }

    pub fn favorite_count(&self) -> usize {
        self.state.borrow().favorites.len()
    }

    pub fn toggle_watched(&self, id: &str, watched: bool) -> Result<PendingWrite> {
        self.toggle(StorageKey::Watched, id, watched, |state| &mut state.watched)
    }

    pub fn toggle_favorite(&self, id: &str, favorite: bool) -> Result<PendingWrite> {
        self.toggle(StorageKey::Favorites, id, favorite, |state| &mut state.favorites)
    }

    /// Commits the change in memory and queues the serialized set for the
    /// store. Both happen under the state lock, so the queued value is always
    /// the post-update set and queue order matches commit order.
    fn toggle(
        &self,
        key: StorageKey,
        id: &str,
        member: bool,
        ids_of: fn(&mut GalleryState) -> &mut IdSet,
    ) -> Result<PendingWrite> {
        // stale ids may still be removed
        if member && self.find_record(id).is_none() {
            return Err(GalleryError::UnknownRecord(id.to_string()));
        }

        let mut pending = None;
        self.state.send_modify(|state| {
            let ids = ids_of(state);
            ids.set(id, member);
            pending = Some(self.writes.enqueue(key, serialize_ids(ids)));
        });
        debug!("Set {id} in {} to {member}", key.storage_name());

        pending.ok_or(GalleryError::WriteAbandoned)
    }

    /// Applies a partial update; only fields that actually change are written.
    pub fn update_settings(&self, patch: &SettingsPatch) -> Vec<PendingWrite> {
        let mut pending = Vec::new();
        self.state.send_if_modified(|state| {
            let updated = state.settings.apply(patch);
            let changed = state.settings.diff(&updated);
            for key in &changed {
                pending.push(
                    self.writes
                        .enqueue(StorageKey::Setting(*key), updated.value_of(*key)),
                );
            }
            state.settings = updated;
            !changed.is_empty()
        });
        if !pending.is_empty() {
            info!("Updated {} setting(s)", pending.len());
        }
        pending
    }

    pub fn reset_settings(&self) -> Vec<PendingWrite> {
        self.update_settings(&SettingsPatch::from_settings(&Settings::defaults()))
    }

    pub fn export_settings(&self) -> Result<String> {
        transfer::export_settings(&self.state.borrow().settings)
    }

    /// Rejected documents leave the settings unchanged.
    pub fn import_settings(&self, document: &str) -> Result<Vec<PendingWrite>> {
        let patch = transfer::parse_settings_import(document)?;
        Ok(self.update_settings(&patch))
    }

    pub fn set_search_query(&self, raw: &str) {
        set_query(&self.state, raw);
    }

    /// Debounced search setter for keystroke input.
    pub fn search_input(&self) -> Debouncer<String> {
        let state = self.state.clone();
        Debouncer::new(self.config.search_debounce, move |raw: String| {
            set_query(&state, &raw)
        })
    }

    pub fn view(&self, page: usize) -> Vec<DisplayItem> {
        self.view_with_page_size(self.config.page_size, page)
    }

    pub fn view_with_page_size(&self, page_size: usize, page: usize) -> Vec<DisplayItem> {
        let state = self.snapshot();
        let query = view_query(&state, page_size, page);
        pipeline::derive_view(&self.records, &query, &self.config.media)
    }

    pub fn total_matching(&self) -> usize {
        let state = self.snapshot();
        pipeline::count_matching(&self.records, &view_query(&state, 0, 0))
    }

    /// A single record rendered for the detail view, regardless of filters.
    pub fn detail_item(&self, id: &str) -> Option<DisplayItem> {
        let record = self.find_record(id)?;
        let state = self.snapshot();
        let preference = LanguagePreference::from_settings(&state.settings);
        let localized = LocalizedRecord {
            record,
            title: pipeline::localize_texts(&record.title, &preference),
            info: pipeline::localize_texts(&record.info, &preference),
        };
        Some(pipeline::to_display_item(
            &localized,
            &view_query(&state, 0, 0),
            &self.config.media,
        ))
    }

    pub fn select_from_query(&self, query: &str) -> Option<&VideoRecord> {
        deep_link::select_record(&self.records, query)
    }

    pub fn detail_link(&self, id: &str) -> String {
        deep_link::detail_link(&self.config.page_url, id)
    }
}

fn set_query(state: &watch::Sender<GalleryState>, raw: &str) {
    state.send_if_modified(|current| {
        if current.search_query == raw {
            return false;
        }
        current.search_query = raw.to_string();
        true
    });
}

fn view_query(state: &GalleryState, page_size: usize, page: usize) -> ViewQuery<'_> {
    ViewQuery {
        settings: &state.settings,
        watched: &state.watched,
        favorites: &state.favorites,
        search_query: &state.search_query,
        page_size,
        page,
    }
}
