use crate::settings::SortOrder;
use chrono::{DateTime, Utc};
use log::warn;
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;

/// Search only kicks in once the trimmed query is longer than this.
pub const MIN_SEARCH_CHARS: usize = 2;

pub fn compare_with_order_int(a: i64, b: i64, order: &SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => a.cmp(&b),
        SortOrder::Desc => b.cmp(&a),
    }
}

/// `"1h 5m"`, `"2h"`, `"45m"`; empty for a missing duration.
pub fn format_duration(minutes: i64) -> String {
    if minutes <= 0 {
        return String::new();
    }
    if minutes >= 60 {
        let hours = minutes / 60;
        let remaining_minutes = minutes % 60;
        if remaining_minutes == 0 {
            format!("{hours}h")
        } else {
            format!("{hours}h {remaining_minutes}m")
        }
    } else {
        format!("{minutes}m")
    }
}

pub fn format_unix_date(unix_seconds: i64) -> String {
    match DateTime::<Utc>::from_timestamp(unix_seconds, 0) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => String::new(),
    }
}

pub fn is_search_active(query: &str) -> bool {
    query.trim().chars().count() > MIN_SEARCH_CHARS
}

/// Case-insensitive literal matcher for user-typed search input.
pub struct SearchMatcher {
    pattern: Option<Regex>,
    lowered: String,
}

impl SearchMatcher {
    /// `None` when the query is too short to search with. Only the length
    /// check trims; surrounding spaces are part of the match.
    pub fn new(query: &str) -> Option<Self> {
        if !is_search_active(query) {
            return None;
        }
        let pattern = match RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!("Falling back to plain search for {query:?}: {e}");
                None
            }
        };
        Some(Self {
            pattern,
            lowered: query.to_lowercase(),
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        match &self.pattern {
            Some(pattern) => pattern.is_match(text),
            None => text.to_lowercase().contains(&self.lowered),
        }
    }

    pub fn highlight(&self, text: &str, pre_tag: &str, post_tag: &str) -> String {
        match &self.pattern {
            Some(pattern) => pattern
                .replace_all(text, |caps: &regex::Captures| {
                    format!("{pre_tag}{}{post_tag}", &caps[0])
                })
                .into_owned(),
            None => text.to_string(),
        }
    }
}

/// Wraps every occurrence of an active query in `pre_tag`/`post_tag`.
pub fn highlight(text: &str, query: &str, pre_tag: &str, post_tag: &str) -> String {
    match SearchMatcher::new(query) {
        Some(matcher) => matcher.highlight(text, pre_tag, post_tag),
        None => text.to_string(),
    }
}
