use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SketchError>;

#[derive(Debug, Error)]
pub enum SketchError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unsupported store format: {0}")]
    UnsupportedFormat(String),

    #[error("scorer failed: {0}")]
    Scorer(String),

    #[error("sketch service is no longer running")]
    ServiceUnavailable,
}
