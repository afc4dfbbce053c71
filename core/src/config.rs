use lazy_static::lazy_static;
use std::env;
use std::time::Duration;

pub const DEFAULT_VIDEO_BASE_URL: &str = "http://d2jkz25f7wglz0.cloudfront.net/";
pub const DEFAULT_TRANSCRIPTION_BASE_URL: &str = "http://saltanat-transcriptions.s3.amazonaws.com/";
pub const DEFAULT_IMAGE_ROOT: &str = "/images";
pub const DEFAULT_PAGE_URL: &str = "index.html";
pub const ITEMS_PER_PAGE: usize = 20;
pub const SEARCH_DEBOUNCE_MS: u64 = 50;

lazy_static! {
    pub static ref VIDEO_BASE_URL: String = env::var("GALLERY_VIDEO_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_VIDEO_BASE_URL.to_string());
    pub static ref TRANSCRIPTION_BASE_URL: String = env::var("GALLERY_TRANSCRIPTION_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_TRANSCRIPTION_BASE_URL.to_string());
    pub static ref IMAGE_ROOT: String =
        env::var("GALLERY_IMAGE_ROOT").unwrap_or_else(|_| DEFAULT_IMAGE_ROOT.to_string());
    pub static ref PAGE_URL: String =
        env::var("GALLERY_PAGE_URL").unwrap_or_else(|_| DEFAULT_PAGE_URL.to_string());
    pub static ref PAGE_SIZE: usize = env::var("GALLERY_PAGE_SIZE")
        .unwrap_or_else(|_| ITEMS_PER_PAGE.to_string())
        .parse::<usize>()
        .ok()
        .filter(|size| *size > 0)
        .unwrap_or(ITEMS_PER_PAGE);
    pub static ref DEBOUNCE_MS: u64 = env::var("GALLERY_SEARCH_DEBOUNCE_MS")
        .unwrap_or_else(|_| SEARCH_DEBOUNCE_MS.to_string())
        .parse::<u64>()
        .unwrap_or(SEARCH_DEBOUNCE_MS);
}

/// Base locations used to turn relative record paths into absolute URLs.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaUrls {
    pub video_base: String,
    pub transcription_base: String,
    pub image_root: String,
}

impl Default for MediaUrls {
    fn default() -> Self {
        Self {
            video_base: DEFAULT_VIDEO_BASE_URL.to_string(),
            transcription_base: DEFAULT_TRANSCRIPTION_BASE_URL.to_string(),
            image_root: DEFAULT_IMAGE_ROOT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryConfig {
    pub media: MediaUrls,
    pub page_url: String,
    pub page_size: usize,
    pub search_debounce: Duration,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            media: MediaUrls::default(),
            page_url: DEFAULT_PAGE_URL.to_string(),
            page_size: ITEMS_PER_PAGE,
            search_debounce: Duration::from_millis(SEARCH_DEBOUNCE_MS),
        }
    }
}

impl GalleryConfig {
    /// Reads the `GALLERY_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            media: MediaUrls {
                video_base: VIDEO_BASE_URL.clone(),
                transcription_base: TRANSCRIPTION_BASE_URL.clone(),
                image_root: IMAGE_ROOT.clone(),
            },
            page_url: PAGE_URL.clone(),
            page_size: *PAGE_SIZE,
            search_debounce: Duration::from_millis(*DEBOUNCE_MS),
        }
    }
}
