pub mod config;
pub mod debounce;
pub mod deep_link;
pub mod error;
pub mod gallery;
pub mod id_set;
pub mod models;
pub mod persistence;
pub mod pipeline;
pub mod session;
pub mod settings;
pub mod store;
pub mod transfer;
pub mod utils;

pub use config::{GalleryConfig, MediaUrls};
pub use error::{GalleryError, Result};
pub use gallery::{Gallery, GalleryState};
pub use id_set::IdSet;
pub use models::{load_records, DisplayItem, VideoRecord};
pub use persistence::{PendingWrite, StorageKey};
pub use session::{DetailSession, DetailView};
pub use settings::{Settings, SettingsPatch};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
