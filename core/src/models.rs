use crate::error::{GalleryError, Result};
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Language a record was recorded in, or a translation is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordLanguage {
    English,
    Turkish,
    Arabic,
    Unknown,
}

impl RecordLanguage {
    pub fn from_name(name: &str) -> Self {
        match name {
            "english" => RecordLanguage::English,
            "turkish" => RecordLanguage::Turkish,
            "arabic" => RecordLanguage::Arabic,
            _ => RecordLanguage::Unknown,
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            RecordLanguage::English => "EN",
            RecordLanguage::Turkish => "TR",
            RecordLanguage::Arabic => "AR",
            RecordLanguage::Unknown => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default, deserialize_with = "nullable")]
    pub lang: String,
    #[serde(default, deserialize_with = "nullable")]
    pub text: String,
}

impl LocalizedText {
    pub fn language(&self) -> RecordLanguage {
        RecordLanguage::from_name(&self.lang)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transcription {
    #[serde(default, deserialize_with = "nullable")]
    pub lang: String,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: Vec<LocalizedText>,
    #[serde(default, deserialize_with = "nullable")]
    pub info: Vec<LocalizedText>,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub transcriptions: Vec<Transcription>,
    #[serde(default, deserialize_with = "nullable")]
    pub created: i64, // unix seconds
    #[serde(default, deserialize_with = "nullable")]
    pub lang: String,
    #[serde(default, deserialize_with = "nullable")]
    pub duration: i64, // in minutes
}

impl VideoRecord {
    pub fn language(&self) -> RecordLanguage {
        RecordLanguage::from_name(&self.lang)
    }
}

/// Treats an explicit `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionLink {
    pub label: String,
    pub url: String,
}

/// A record after filtering, localization and URL resolution, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub language: RecordLanguage,
    pub video_url: String,
    pub thumbnail_url: String,
    pub formatted_duration: String,
    pub created: Option<DateTime<Utc>>,
    pub transcriptions: Vec<TranscriptionLink>,
    pub is_watched: bool,
    pub is_favorite: bool,
}

/// Parses the bundled dataset. Entries that do not deserialize are skipped.
pub fn load_records(json: &str) -> Result<Vec<VideoRecord>> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| GalleryError::Dataset(e.to_string()))?;

    let Value::Array(entries) = value else {
        return Err(GalleryError::Dataset(
            "expected a JSON array of video records".to_string(),
        ));
    };

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<VideoRecord>(entry) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping malformed video record at index {index}: {e}"),
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_null_fields_fall_back_to_empty_values() {
        let records = load_records(
            r#"[
                {"id": "1", "title": null, "created": 100},
                {"id": "2", "lang": "turkish", "duration": 75, "info": [{"lang": "turkish", "text": "bilgi"}]}
            ]"#,
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert!(records[0].title.is_empty());
        assert_eq!(records[0].duration, 0);
        assert_eq!(records[0].language(), RecordLanguage::Unknown);
        assert_eq!(records[1].language(), RecordLanguage::Turkish);
        assert_eq!(records[1].info[0].text, "bilgi");
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let records = load_records(r#"[{"title": []}, {"id": "7"}, 42]"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "7");
    }

    #[test]
    fn non_array_dataset_is_rejected() {
        assert!(matches!(
            load_records(r#"{"id": "1"}"#),
            Err(GalleryError::Dataset(_))
        ));
        assert!(load_records("not json").is_err());
    }
}
