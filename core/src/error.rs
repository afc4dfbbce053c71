use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("storage error: {0}")]
    Store(String),

    #[error("invalid settings file: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unexpected settings shape: {0}")]
    UnexpectedShape(String),

    #[error("unknown record: {0}")]
    UnknownRecord(String),

    #[error("failed to parse dataset: {0}")]
    Dataset(String),

    #[error("persistence writer stopped before the write completed")]
    WriteAbandoned,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GalleryError>;
