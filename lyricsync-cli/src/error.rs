use lyricsync_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to read lyrics from {}: {source}", path.display())]
    ReadLyrics {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Line {index} is out of range (document has {len} lines)")]
    LineOutOfRange { index: usize, len: usize },

    #[error("Failed to serialize document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to create tokio runtime: {0}")]
    Runtime(std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
