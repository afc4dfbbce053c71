//! Turns the bundled records plus user state into the list shown on screen.
//!
//! Steps run in a fixed order: category filter, watched visibility,
//! localization, search, sort, pagination. Search must see the localized
//! text, so localization comes before it.

use crate::config::MediaUrls;
use crate::id_set::IdSet;
use crate::models::{DisplayItem, LocalizedText, RecordLanguage, TranscriptionLink, VideoRecord};
use crate::settings::{Filter, ImageSet, Settings, Sort, SortBy};
use crate::utils::{compare_with_order_int, format_duration, SearchMatcher};
use chrono::{DateTime, Utc};

/// Everything besides the records that a view depends on.
#[derive(Debug, Clone, Copy)]
pub struct ViewQuery<'a> {
    pub settings: &'a Settings,
    pub watched: &'a IdSet,
    pub favorites: &'a IdSet,
    pub search_query: &'a str,
    pub page_size: usize,
    pub page: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguagePreference {
    pub primary: RecordLanguage,
    pub secondary: RecordLanguage,
}

impl LanguagePreference {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            primary: settings.primary_preferred_language.record_language(),
            secondary: settings.secondary_preferred_language.record_language(),
        }
    }

    pub fn score(&self, language: RecordLanguage) -> u8 {
        if language == self.primary {
            2
        } else if language == self.secondary {
            1
        } else {
            0
        }
    }
}

/// A record with its translations reordered by language preference.
#[derive(Debug, Clone)]
pub struct LocalizedRecord<'a> {
    pub record: &'a VideoRecord,
    pub title: Vec<&'a LocalizedText>,
    pub info: Vec<&'a LocalizedText>,
}

impl LocalizedRecord<'_> {
    pub fn title_text(&self) -> &str {
        self.title.first().map_or("", |t| t.text.as_str())
    }

    pub fn info_text(&self) -> &str {
        self.info.first().map_or("", |t| t.text.as_str())
    }
}

pub fn filter_by_category<'a>(
    records: &'a [VideoRecord],
    filter: Filter,
    favorites: &IdSet,
) -> Vec<&'a VideoRecord> {
    records
        .iter()
        .filter(|record| match filter {
            Filter::All => true,
            Filter::Fav => favorites.contains(&record.id),
            language => language.record_language() == Some(record.language()),
        })
        .collect()
}

pub fn filter_watched<'a>(
    records: Vec<&'a VideoRecord>,
    display_watched: bool,
    watched: &IdSet,
) -> Vec<&'a VideoRecord> {
    if display_watched {
        return records;
    }
    records
        .into_iter()
        .filter(|record| !watched.contains(&record.id))
        .collect()
}

/// Stable reorder: preferred languages first, original order among equals.
pub fn localize_texts<'a>(
    texts: &'a [LocalizedText],
    preference: &LanguagePreference,
) -> Vec<&'a LocalizedText> {
    let mut sorted: Vec<&LocalizedText> = texts.iter().collect();
    sorted.sort_by_key(|text| std::cmp::Reverse(preference.score(text.language())));
    sorted
}

pub fn localize<'a>(
    records: Vec<&'a VideoRecord>,
    preference: &LanguagePreference,
) -> Vec<LocalizedRecord<'a>> {
    records
        .into_iter()
        .map(|record| LocalizedRecord {
            record,
            title: localize_texts(&record.title, preference),
            info: localize_texts(&record.info, preference),
        })
        .collect()
}

pub fn search<'a>(records: Vec<LocalizedRecord<'a>>, query: &str) -> Vec<LocalizedRecord<'a>> {
    let Some(matcher) = SearchMatcher::new(query) else {
        return records;
    };
    records
        .into_iter()
        .filter(|record| {
            matcher.is_match(record.title_text()) || matcher.is_match(record.info_text())
        })
        .collect()
}

/// Stable sort; ties keep their incoming order.
pub fn sort_records(records: &mut [LocalizedRecord<'_>], sort: Sort) {
    records.sort_by(|a, b| {
        let (x, y) = match sort.by {
            SortBy::Date => (a.record.created, b.record.created),
            SortBy::Duration => (a.record.duration, b.record.duration),
        };
        compare_with_order_int(x, y, &sort.order)
    });
}

/// Steps one through five: the full filtered and sorted list, unpaginated.
pub fn matching_records<'a>(
    records: &'a [VideoRecord],
    query: &ViewQuery<'_>,
) -> Vec<LocalizedRecord<'a>> {
    let settings = query.settings;
    let selected = filter_by_category(records, settings.filter, query.favorites);
    let visible = filter_watched(selected, settings.display_watched_records, query.watched);
    let localized = localize(visible, &LanguagePreference::from_settings(settings));
    let mut found = search(localized, query.search_query);
    sort_records(&mut found, settings.sort);
    found
}

pub fn count_matching(records: &[VideoRecord], query: &ViewQuery<'_>) -> usize {
    matching_records(records, query).len()
}

/// The first `page_size * (page + 1)` matching records, ready to render.
pub fn derive_view(
    records: &[VideoRecord],
    query: &ViewQuery<'_>,
    urls: &MediaUrls,
) -> Vec<DisplayItem> {
    let limit = query.page_size.saturating_mul(query.page.saturating_add(1));
    matching_records(records, query)
        .into_iter()
        .take(limit)
        .map(|localized| to_display_item(&localized, query, urls))
        .collect()
}

pub fn to_display_item(
    localized: &LocalizedRecord<'_>,
    query: &ViewQuery<'_>,
    urls: &MediaUrls,
) -> DisplayItem {
    let record = localized.record;
    DisplayItem {
        id: record.id.clone(),
        title: localized.title_text().to_string(),
        description: localized.info_text().to_string(),
        language: record.language(),
        video_url: video_url(urls, &record.url),
        thumbnail_url: thumbnail_url(urls, query.settings.image_set, &record.id),
        formatted_duration: format_duration(record.duration),
        created: DateTime::<Utc>::from_timestamp(record.created, 0),
        transcriptions: record
            .transcriptions
            .iter()
            .map(|transcription| TranscriptionLink {
                label: transcription_label(&transcription.lang),
                url: transcription_url(urls, &transcription.url),
            })
            .collect(),
        is_watched: query.watched.contains(&record.id),
        is_favorite: query.favorites.contains(&record.id),
    }
}

fn resolve(base: &str, path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    if path.starts_with("http") {
        return path.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub fn video_url(urls: &MediaUrls, path: &str) -> String {
    resolve(&urls.video_base, path)
}

pub fn transcription_url(urls: &MediaUrls, path: &str) -> String {
    resolve(&urls.transcription_base, path)
}

/// Thumbnails cycle through the active set by numeric id.
pub fn thumbnail_url(urls: &MediaUrls, image_set: ImageSet, id: &str) -> String {
    let count = image_set.thumbnail_count();
    let index = id
        .trim()
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0, |acc, digit| (acc * 10 + u64::from(digit)) % count);
    format!(
        "{}/{}/{index}.webp",
        urls.image_root.trim_end_matches('/'),
        image_set.directory()
    )
}

fn transcription_label(lang: &str) -> String {
    match lang {
        "en" => "English".to_string(),
        "tr" => "Turkish".to_string(),
        "ar" => "Arabic".to_string(),
        other => other.to_string(),
    }
}
