use crate::error::{GalleryError, Result};
use crate::models::RecordLanguage;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

pub const NATURE_THUMBNAILS: u64 = 36;
pub const THEMED_THUMBNAILS: u64 = 27;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSet {
    Nature,
    Themed,
}

impl ImageSet {
    pub fn key(&self) -> &'static str {
        match self {
            ImageSet::Nature => "nature",
            ImageSet::Themed => "themed",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "nature" => Some(ImageSet::Nature),
            // older installs persisted the asset directory name
            "themed" | "seyh-muhammed-nazim-adil-el-hakkani" => Some(ImageSet::Themed),
            _ => None,
        }
    }

    /// Asset directory the thumbnails of this set live in.
    pub fn directory(&self) -> &'static str {
        match self {
            ImageSet::Nature => "nature",
            ImageSet::Themed => "seyh-muhammed-nazim-adil-el-hakkani",
        }
    }

    pub fn thumbnail_count(&self) -> u64 {
        match self {
            ImageSet::Nature => NATURE_THUMBNAILS,
            ImageSet::Themed => THEMED_THUMBNAILS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Tr,
    Ar,
}

impl Language {
    pub fn key(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Tr => "tr",
            Language::Ar => "ar",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "en" => Some(Language::En),
            "tr" => Some(Language::Tr),
            "ar" => Some(Language::Ar),
            _ => None,
        }
    }

    pub fn record_language(&self) -> RecordLanguage {
        match self {
            Language::En => RecordLanguage::English,
            Language::Tr => RecordLanguage::Turkish,
            Language::Ar => RecordLanguage::Arabic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Date,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Sort setting, persisted as `date-desc`, `duration-asc`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Sort {
    pub by: SortBy,
    pub order: SortOrder,
}

impl Sort {
    pub const DATE_DESC: Sort = Sort {
        by: SortBy::Date,
        order: SortOrder::Desc,
    };

    pub fn key(&self) -> &'static str {
        match (self.by, self.order) {
            (SortBy::Date, SortOrder::Desc) => "date-desc",
            (SortBy::Date, SortOrder::Asc) => "date-asc",
            (SortBy::Duration, SortOrder::Desc) => "duration-desc",
            (SortBy::Duration, SortOrder::Asc) => "duration-asc",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let (by, order) = match key {
            "date-desc" | "default" => (SortBy::Date, SortOrder::Desc),
            "date-asc" => (SortBy::Date, SortOrder::Asc),
            "duration-desc" => (SortBy::Duration, SortOrder::Desc),
            "duration-asc" => (SortBy::Duration, SortOrder::Asc),
            _ => return None,
        };
        Some(Sort { by, order })
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl From<Sort> for String {
    fn from(sort: Sort) -> Self {
        sort.key().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    All,
    Fav,
    En,
    Tr,
    Ar,
}

impl Filter {
    pub fn key(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Fav => "fav",
            Filter::En => "en",
            Filter::Tr => "tr",
            Filter::Ar => "ar",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "all" => Some(Filter::All),
            "fav" => Some(Filter::Fav),
            "en" => Some(Filter::En),
            "tr" => Some(Filter::Tr),
            "ar" => Some(Filter::Ar),
            _ => None,
        }
    }

    /// The record language a language filter selects.
    pub fn record_language(&self) -> Option<RecordLanguage> {
        match self {
            Filter::En => Some(RecordLanguage::English),
            Filter::Tr => Some(RecordLanguage::Turkish),
            Filter::Ar => Some(RecordLanguage::Arabic),
            Filter::All | Filter::Fav => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ImageSet,
    PrimaryPreferredLanguage,
    SecondaryPreferredLanguage,
    Sort,
    Filter,
    DisplayWatchedRecords,
    AutoPlayVideo,
    AutoMarkWatched,
}

impl SettingKey {
    pub const ALL: [SettingKey; 8] = [
        SettingKey::ImageSet,
        SettingKey::PrimaryPreferredLanguage,
        SettingKey::SecondaryPreferredLanguage,
        SettingKey::Sort,
        SettingKey::Filter,
        SettingKey::DisplayWatchedRecords,
        SettingKey::AutoPlayVideo,
        SettingKey::AutoMarkWatched,
    ];

    /// Field name as it appears in exported settings documents.
    pub fn field_name(&self) -> &'static str {
        match self {
            SettingKey::ImageSet => "imageSet",
            SettingKey::PrimaryPreferredLanguage => "primaryPreferredLanguage",
            SettingKey::SecondaryPreferredLanguage => "secondaryPreferredLanguage",
            SettingKey::Sort => "sort",
            SettingKey::Filter => "filter",
            SettingKey::DisplayWatchedRecords => "displayWatchedRecords",
            SettingKey::AutoPlayVideo => "autoPlayVideo",
            SettingKey::AutoMarkWatched => "autoMarkWatched",
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.field_name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub image_set: ImageSet,
    pub primary_preferred_language: Language,
    pub secondary_preferred_language: Language,
    pub sort: Sort,
    pub filter: Filter,
    pub display_watched_records: bool,
    pub auto_play_video: bool,
    pub auto_mark_watched: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            image_set: ImageSet::Nature,
            primary_preferred_language: Language::En,
            secondary_preferred_language: Language::Tr,
            sort: Sort::DATE_DESC,
            filter: Filter::All,
            display_watched_records: true,
            auto_play_video: true,
            auto_mark_watched: true,
        }
    }
}

impl Settings {
    pub fn defaults() -> Self {
        Self::default()
    }

    /// Builds settings from a field-name keyed map. Absent or invalid fields
    /// take their default; this never fails.
    pub fn normalize(raw: &Map<String, Value>) -> Self {
        let mut patch = SettingsPatch::default();
        for key in SettingKey::ALL {
            if let Some(value) = raw.get(key.field_name()) {
                patch.assign(key, value);
            }
        }
        Settings::default().apply(&patch)
    }

    /// Keys whose values differ between `self` and `other`.
    pub fn diff(&self, other: &Settings) -> Vec<SettingKey> {
        SettingKey::ALL
            .into_iter()
            .filter(|key| self.value_of(*key) != other.value_of(*key))
            .collect()
    }

    pub fn apply(&self, patch: &SettingsPatch) -> Settings {
        Settings {
            image_set: patch.image_set.unwrap_or(self.image_set),
            primary_preferred_language: patch
                .primary_preferred_language
                .unwrap_or(self.primary_preferred_language),
            secondary_preferred_language: patch
                .secondary_preferred_language
                .unwrap_or(self.secondary_preferred_language),
            sort: patch.sort.unwrap_or(self.sort),
            filter: patch.filter.unwrap_or(self.filter),
            display_watched_records: patch
                .display_watched_records
                .unwrap_or(self.display_watched_records),
            auto_play_video: patch.auto_play_video.unwrap_or(self.auto_play_video),
            auto_mark_watched: patch.auto_mark_watched.unwrap_or(self.auto_mark_watched),
        }
    }

    /// Scalar value of one field, as persisted and exported.
    pub fn value_of(&self, key: SettingKey) -> Value {
        match key {
            SettingKey::ImageSet => Value::from(self.image_set.key()),
            SettingKey::PrimaryPreferredLanguage => {
                Value::from(self.primary_preferred_language.key())
            }
            SettingKey::SecondaryPreferredLanguage => {
                Value::from(self.secondary_preferred_language.key())
            }
            SettingKey::Sort => Value::from(self.sort.key()),
            SettingKey::Filter => Value::from(self.filter.key()),
            SettingKey::DisplayWatchedRecords => Value::from(self.display_watched_records),
            SettingKey::AutoPlayVideo => Value::from(self.auto_play_video),
            SettingKey::AutoMarkWatched => Value::from(self.auto_mark_watched),
        }
    }
}

/// Partial settings update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub image_set: Option<ImageSet>,
    pub primary_preferred_language: Option<Language>,
    pub secondary_preferred_language: Option<Language>,
    pub sort: Option<Sort>,
    pub filter: Option<Filter>,
    pub display_watched_records: Option<bool>,
    pub auto_play_video: Option<bool>,
    pub auto_mark_watched: Option<bool>,
}

impl SettingsPatch {
    /// A patch that sets every field to the value in `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            image_set: Some(settings.image_set),
            primary_preferred_language: Some(settings.primary_preferred_language),
            secondary_preferred_language: Some(settings.secondary_preferred_language),
            sort: Some(settings.sort),
            filter: Some(settings.filter),
            display_watched_records: Some(settings.display_watched_records),
            auto_play_video: Some(settings.auto_play_video),
            auto_mark_watched: Some(settings.auto_mark_watched),
        }
    }

    /// Strict counterpart of [`Settings::normalize`]: any known field with an
    /// invalid value rejects the whole document. Unknown fields are ignored.
    pub fn from_json_object(object: &Map<String, Value>) -> Result<Self> {
        let mut patch = SettingsPatch::default();
        for key in SettingKey::ALL {
            if let Some(value) = object.get(key.field_name()) {
                patch.set(key, value)?;
            }
        }
        Ok(patch)
    }

    pub fn set(&mut self, key: SettingKey, value: &Value) -> Result<()> {
        if self.assign(key, value) {
            Ok(())
        } else {
            Err(GalleryError::UnexpectedShape(format!(
                "invalid value for {}: {value}",
                key.field_name()
            )))
        }
    }

    fn assign(&mut self, key: SettingKey, value: &Value) -> bool {
        match key {
            SettingKey::ImageSet => {
                store_parsed(&mut self.image_set, parse_key(value, ImageSet::from_key))
            }
            SettingKey::PrimaryPreferredLanguage => store_parsed(
                &mut self.primary_preferred_language,
                parse_key(value, Language::from_key),
            ),
            SettingKey::SecondaryPreferredLanguage => store_parsed(
                &mut self.secondary_preferred_language,
                parse_key(value, Language::from_key),
            ),
            SettingKey::Sort => store_parsed(&mut self.sort, parse_key(value, Sort::from_key)),
            SettingKey::Filter => {
                store_parsed(&mut self.filter, parse_key(value, Filter::from_key))
            }
            SettingKey::DisplayWatchedRecords => {
                store_parsed(&mut self.display_watched_records, parse_flag(value))
            }
            SettingKey::AutoPlayVideo => store_parsed(&mut self.auto_play_video, parse_flag(value)),
            SettingKey::AutoMarkWatched => {
                store_parsed(&mut self.auto_mark_watched, parse_flag(value))
            }
        }
    }
}

fn store_parsed<T>(slot: &mut Option<T>, parsed: Option<T>) -> bool {
    match parsed {
        Some(value) => {
            *slot = Some(value);
            true
        }
        None => false,
    }
}

fn parse_key<T>(value: &Value, from_key: fn(&str) -> Option<T>) -> Option<T> {
    value.as_str().and_then(from_key)
}

fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(s) => s.parse::<bool>().ok(),
        _ => None,
    }
}
