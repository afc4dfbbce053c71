use gallery_core::utils::{format_unix_date, highlight};
use gallery_core::{DetailView, DisplayItem, Gallery, Settings};

const PRE_TAG: &str = "\x1b[1;33m";
const POST_TAG: &str = "\x1b[0m";

pub fn render_header(gallery: &Gallery) -> String {
    format!(
        "{} videos | {} watched | {} favorites",
        gallery.records().len(),
        gallery.watched_count(),
        gallery.favorite_count()
    )
}

pub fn render_card(item: &DisplayItem, query: &str) -> String {
    let mut badges = Vec::new();
    if !item.language.badge().is_empty() {
        badges.push(item.language.badge().to_string());
    }
    if !item.formatted_duration.is_empty() {
        badges.push(item.formatted_duration.clone());
    }
    if let Some(created) = item.created {
        badges.push(format_unix_date(created.timestamp()));
    }

    let mut marks = String::new();
    if item.is_watched {
        marks.push_str(" ✓");
    }
    if item.is_favorite {
        marks.push_str(" ★");
    }

    format!(
        "[{}] {} ({}){}\n    {}",
        item.id,
        highlight(&item.title, query, PRE_TAG, POST_TAG),
        badges.join(" · "),
        marks,
        highlight(&item.description, query, PRE_TAG, POST_TAG)
    )
}

pub fn render_list(items: &[DisplayItem], total: usize, query: &str, page: usize) -> String {
    if items.is_empty() {
        return "No videos found".to_string();
    }
    let mut out: Vec<String> = items.iter().map(|item| render_card(item, query)).collect();
    if items.len() < total {
        out.push(format!(
            "-- {} of {total} shown, use --page {} to load more --",
            items.len(),
            page + 1
        ));
    }
    out.join("\n")
}

pub fn render_detail(view: &DetailView) -> String {
    let item = &view.item;
    let mut lines = vec![
        item.title.clone(),
        String::new(),
        item.description.clone(),
        String::new(),
        format!("Video:     {}", item.video_url),
        format!("Thumbnail: {}", item.thumbnail_url),
        format!("Autoplay:  {}", if view.auto_play { "on" } else { "off" }),
        format!("Link:      {}", view.link),
        format!(
            "Status:    {}{}",
            if item.is_watched { "watched" } else { "not watched" },
            if item.is_favorite { ", favorite" } else { "" }
        ),
    ];
    if !item.transcriptions.is_empty() {
        lines.push("Transcriptions:".to_string());
        for transcription in &item.transcriptions {
            lines.push(format!("  {}: {}", transcription.label, transcription.url));
        }
    }
    lines.join("\n")
}

pub fn render_settings(settings: &Settings) -> String {
    format!(
        "imageSet                   {}\n\
         primaryPreferredLanguage   {}\n\
         secondaryPreferredLanguage {}\n\
         sort                       {}\n\
         filter                     {}\n\
         displayWatchedRecords      {}\n\
         autoPlayVideo              {}\n\
         autoMarkWatched            {}",
        settings.image_set.key(),
        settings.primary_preferred_language.key(),
        settings.secondary_preferred_language.key(),
        settings.sort,
        settings.filter.key(),
        settings.display_watched_records,
        settings.auto_play_video,
        settings.auto_mark_watched
    )
}
