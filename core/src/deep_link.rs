use crate::models::VideoRecord;

pub const VIDEO_ID_PARAM: &str = "videoId";

/// Extracts the `videoId` parameter from a page query string.
pub fn parse_deep_link(query: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == VIDEO_ID_PARAM)
        .and_then(|(_, value)| {
            urlencoding::decode(&value.replace('+', " "))
                .ok()
                .map(|decoded| decoded.into_owned())
        })
        .filter(|value| !value.is_empty())
}

/// The record a deep link points at, if it exists in the dataset.
pub fn select_record<'a>(records: &'a [VideoRecord], query: &str) -> Option<&'a VideoRecord> {
    let id = parse_deep_link(query)?;
    records.iter().find(|record| record.id == id)
}

/// Link that opens `id` directly in the detail view, e.g. in a new tab.
pub fn detail_link(page_url: &str, id: &str) -> String {
    format!("{page_url}?{VIDEO_ID_PARAM}={}", urlencoding::encode(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<VideoRecord> {
        ["10", "a b"]
            .into_iter()
            .map(|id| VideoRecord {
                id: id.to_string(),
                ..VideoRecord::default()
            })
            .collect()
    }

    #[test]
    fn selects_existing_record_only() {
        let records = records();
        assert_eq!(select_record(&records, "?videoId=10").map(|r| r.id.as_str()), Some("10"));
        assert_eq!(select_record(&records, "o&videoId=a%20b").map(|r| r.id.as_str()), Some("a b"));
        assert!(select_record(&records, "?videoId=99").is_none());
        assert!(select_record(&records, "?videoId=").is_none());
        assert!(select_record(&records, "").is_none());
    }

    #[test]
    fn links_round_trip() {
        let link = detail_link("index.html", "a b");
        assert_eq!(link, "index.html?videoId=a%20b");
        let query = link.split_once('?').map(|(_, q)| q).unwrap();
        assert_eq!(parse_deep_link(query), Some("a b".to_string()));
    }
}
