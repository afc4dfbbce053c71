// End-to-end behaviour of the gallery against an in-memory store.
use gallery_core::settings::{Filter, Sort};
use gallery_core::{
    DetailSession, Gallery, GalleryConfig, GalleryError, JsonFileStore, MemoryStore,
    SettingsPatch, VideoRecord,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const DATASET: &str = r#"[
    {"id": "1", "title": [{"lang": "english", "text": "Patience"}], "info": [{"lang": "english", "text": "On patience"}],
     "url": "2020/1.mp4", "transcriptions": [], "created": 100, "lang": "english", "duration": 5},
    {"id": "2", "title": [{"lang": "turkish", "text": "Sabır"}, {"lang": "english", "text": "Gratitude"}],
     "info": [{"lang": "english", "text": "On gratitude"}], "url": "2020/2.mp4", "transcriptions": [],
     "created": 200, "lang": "turkish", "duration": 50},
    {"id": "3", "title": [{"lang": "arabic", "text": "Sabr"}], "url": "2020/3.mp4",
     "created": 150, "lang": "arabic", "duration": 90}
]"#;

fn records() -> Vec<VideoRecord> {
    gallery_core::load_records(DATASET).unwrap()
}

async fn gallery_with(store: &MemoryStore) -> Gallery {
    Gallery::load(Arc::new(store.clone()), records(), GalleryConfig::default()).await
}

fn ids(gallery: &Gallery) -> Vec<String> {
    gallery.view(0).into_iter().map(|item| item.id).collect()
}

#[tokio::test]
async fn loads_persisted_state_before_deriving_the_view() {
    let store = MemoryStore::with_values([
        ("settingSort", json!("date-asc")),
        ("settingDisplayWatchedRecords", json!(false)),
        ("settingWatched", json!("3")),
        ("settingFavorites", json!("2,2,")),
    ]);
    let gallery = gallery_with(&store).await;

    assert_eq!(ids(&gallery), vec!["1", "2"]);
    assert_eq!(gallery.watched_count(), 1);
    assert_eq!(gallery.favorite_count(), 1);
    assert!(gallery.is_favorite("2"));
    assert_eq!(gallery.total_matching(), 2);
}

#[tokio::test]
async fn toggling_twice_restores_the_set_and_writes_both_values() {
    let store = MemoryStore::new();
    let gallery = gallery_with(&store).await;

    let first = gallery.toggle_watched("2", true).unwrap();
    let second = gallery.toggle_watched("2", false).unwrap();
    first.wait().await.unwrap();
    second.wait().await.unwrap();

    assert!(!gallery.is_watched("2"));
    assert_eq!(
        store.writes(),
        vec![
            ("settingWatched".to_string(), json!("2")),
            ("settingWatched".to_string(), json!("")),
        ]
    );
}

#[tokio::test]
async fn rapid_toggles_never_lose_an_update() {
    let store = MemoryStore::new();
    let gallery = gallery_with(&store).await;

    let mut pending = Vec::new();
    for id in ["1", "2", "3", "1"] {
        pending.push(gallery.toggle_favorite(id, true).unwrap());
    }
    pending.push(gallery.toggle_favorite("2", false).unwrap());
    for write in pending {
        write.wait().await.unwrap();
    }

    assert_eq!(store.value("settingFavorites"), Some(json!("1,3")));
    assert_eq!(gallery.snapshot().favorites.to_storage_string(), "1,3");
}

#[tokio::test]
async fn failed_writes_keep_the_in_memory_change() {
    let store = MemoryStore::new();
    store.fail_writes(true);
    let gallery = gallery_with(&store).await;

    let result = gallery.toggle_watched("1", true).unwrap().wait().await;
    assert!(matches!(result, Err(GalleryError::Store(_))));
    assert!(gallery.is_watched("1"));
}

#[tokio::test]
async fn favorites_filter_and_language_filter() {
    let store = MemoryStore::new();
    let gallery = gallery_with(&store).await;
    gallery.toggle_favorite("3", true).unwrap();
    gallery.toggle_favorite("1", true).unwrap();

    gallery.update_settings(&SettingsPatch {
        filter: Some(Filter::Fav),
        ..SettingsPatch::default()
    });
    assert_eq!(ids(&gallery), vec!["3", "1"]);

    gallery.update_settings(&SettingsPatch {
        filter: Some(Filter::Tr),
        sort: Some(Sort::from_key("duration-asc").unwrap()),
        ..SettingsPatch::default()
    });
    assert_eq!(ids(&gallery), vec!["2"]);
}

#[tokio::test]
async fn import_is_partial_and_invalid_documents_change_nothing() {
    let store = MemoryStore::new();
    let gallery = gallery_with(&store).await;

    let pending = gallery
        .import_settings(r#"{"filter": "ar", "autoPlayVideo": false}"#)
        .unwrap();
    assert_eq!(pending.len(), 2);
    for write in pending {
        write.wait().await.unwrap();
    }
    assert_eq!(store.value("settingFilter"), Some(json!("ar")));
    assert_eq!(store.value("settingAutoPlayVideo"), Some(json!(false)));

    let before = gallery.snapshot().settings;
    assert!(gallery.import_settings("not json").is_err());
    assert!(gallery.import_settings(r#"{"filter": "everything"}"#).is_err());
    assert_eq!(gallery.snapshot().settings, before);

    let exported: serde_json::Value =
        serde_json::from_str(&gallery.export_settings().unwrap()).unwrap();
    assert_eq!(exported["filter"], json!("ar"));
    assert_eq!(exported.as_object().unwrap().len(), 8);

    let pending = gallery.reset_settings();
    assert_eq!(pending.len(), 2);
    assert_eq!(gallery.snapshot().settings, gallery_core::Settings::defaults());
}

#[tokio::test(start_paused = true)]
async fn debounced_search_commits_the_last_keystroke() {
    let store = MemoryStore::new();
    let gallery = gallery_with(&store).await;
    let input = gallery.search_input();

    for typed in ["g", "gr", "gra", "grat"] {
        input.call(typed.to_string());
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(gallery.snapshot().search_query, "");

    tokio::time::sleep(Duration::from_millis(100)).await;
    tokio::task::yield_now().await;
    assert_eq!(gallery.snapshot().search_query, "grat");
    // the displayed title of record 2 is the english one
    assert_eq!(ids(&gallery), vec!["2"]);

    input.call("zzz".to_string());
    input.cancel();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(gallery.snapshot().search_query, "grat");
}

#[tokio::test]
async fn detail_session_auto_marks_once_per_viewing() {
    let store = MemoryStore::new();
    let gallery = gallery_with(&store).await;
    let mut session = DetailSession::new();

    let first = session.open(&gallery, "1").unwrap();
    assert!(first.is_some());
    first.unwrap().wait().await.unwrap();

    // re-render of the same viewing after the user un-marked it
    gallery.toggle_watched("1", false).unwrap().wait().await.unwrap();
    assert!(session.open(&gallery, "1").unwrap().is_none());
    assert!(session.auto_mark_watched_on_open(&gallery, "1").is_none());
    assert!(!gallery.is_watched("1"));

    session.close();
    assert!(session.open(&gallery, "1").unwrap().is_some());
    assert!(gallery.is_watched("1"));

    let view = session.view(&gallery).unwrap();
    assert_eq!(view.item.title, "Patience");
    assert!(view.auto_play);
    assert_eq!(view.link, "index.html?videoId=1");

    assert!(matches!(
        session.open(&gallery, "404"),
        Err(GalleryError::UnknownRecord(_))
    ));
}

#[tokio::test]
async fn auto_mark_respects_the_setting() {
    let store = MemoryStore::with_values([("settingAutoMarkWatched", json!(false))]);
    let gallery = gallery_with(&store).await;
    let mut session = DetailSession::new();

    assert!(session.open(&gallery, "2").unwrap().is_none());
    assert!(!gallery.is_watched("2"));
}

#[tokio::test]
async fn deep_links_select_existing_records() {
    let gallery = gallery_with(&MemoryStore::new()).await;
    assert_eq!(
        gallery.select_from_query("?videoId=3").map(|r| r.id.as_str()),
        Some("3")
    );
    assert!(gallery.select_from_query("?videoId=77").is_none());
    assert!(gallery.select_from_query("?o").is_none());
}

#[tokio::test]
async fn state_survives_a_restart_with_the_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gallery_store.json");

    {
        let store = Arc::new(JsonFileStore::new(&path));
        let gallery = Gallery::load(store, records(), GalleryConfig::default()).await;
        gallery.toggle_watched("1", true).unwrap().wait().await.unwrap();
        for write in gallery.update_settings(&SettingsPatch {
            filter: Some(Filter::En),
            ..SettingsPatch::default()
        }) {
            write.wait().await.unwrap();
        }
    }

    let store = Arc::new(JsonFileStore::new(&path));
    let gallery = Gallery::load(store, records(), GalleryConfig::default()).await;
    assert!(gallery.is_watched("1"));
    assert_eq!(gallery.snapshot().settings.filter, Filter::En);
    assert_eq!(ids(&gallery), vec!["1"]);
}

#[tokio::test]
async fn writes_still_land_after_the_store_file_is_corrupted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gallery_store.json");
    std::fs::write(&path, r#"{"settingWatched": "1""#).unwrap();

    {
        let store = Arc::new(JsonFileStore::new(&path));
        let gallery = Gallery::load(store, records(), GalleryConfig::default()).await;
        assert_eq!(gallery.watched_count(), 0);
        gallery.toggle_watched("2", true).unwrap().wait().await.unwrap();
        gallery.toggle_favorite("1", true).unwrap().wait().await.unwrap();
    }

    let store = Arc::new(JsonFileStore::new(&path));
    let gallery = Gallery::load(store, records(), GalleryConfig::default()).await;
    assert!(gallery.is_watched("2"));
    assert!(!gallery.is_watched("1"));
    assert!(gallery.is_favorite("1"));
}
