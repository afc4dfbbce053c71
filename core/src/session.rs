use crate::error::{GalleryError, Result};
use crate::gallery::Gallery;
use crate::models::DisplayItem;
use crate::persistence::PendingWrite;
use log::warn;
use std::collections::HashSet;

/// State of the detail view while one video is open.
///
/// Remembers which ids were already auto-marked as watched during the current
/// viewing, so re-rendering the same video does not toggle it again. Closing
/// the view or opening a different video starts a fresh viewing.
#[derive(Debug, Default)]
pub struct DetailSession {
    current: Option<String>,
    auto_marked: HashSet<String>,
}

/// What the detail view renders for the open video.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub item: DisplayItem,
    pub auto_play: bool,
    pub link: String,
}

impl DetailSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, gallery: &Gallery, id: &str) -> Result<Option<PendingWrite>> {
        if gallery.find_record(id).is_none() {
            return Err(GalleryError::UnknownRecord(id.to_string()));
        }
        if self.current.as_deref() != Some(id) {
            self.auto_marked.clear();
            self.current = Some(id.to_string());
        }
        Ok(self.auto_mark_watched_on_open(gallery, id))
    }

    /// Marks `id` watched once per viewing when the setting asks for it.
    pub fn auto_mark_watched_on_open(
        &mut self,
        gallery: &Gallery,
        id: &str,
    ) -> Option<PendingWrite> {
        if self.auto_marked.contains(id) || !gallery.snapshot().settings.auto_mark_watched {
            return None;
        }
        match gallery.toggle_watched(id, true) {
            Ok(pending) => {
                self.auto_marked.insert(id.to_string());
                Some(pending)
            }
            Err(e) => {
                warn!("Could not auto-mark {id} as watched: {e}");
                None
            }
        }
    }

    pub fn view(&self, gallery: &Gallery) -> Option<DetailView> {
        let id = self.current.as_deref()?;
        let item = gallery.detail_item(id)?;
        Some(DetailView {
            item,
            auto_play: gallery.snapshot().settings.auto_play_video,
            link: gallery.detail_link(id),
        })
    }

    pub fn close(&mut self) {
        self.current = None;
        self.auto_marked.clear();
    }
}
