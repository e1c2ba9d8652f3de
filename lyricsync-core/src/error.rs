use crate::romanize::RomanizationKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Romanization errors (never surfaced past the pipeline)
    #[error("Romanization of {script} line failed: {reason}")]
    RomanizationFailed {
        script: RomanizationKind,
        reason: String,
    },

    // Playback collaborator errors
    #[error("Seek request failed: {reason}")]
    SeekFailed { reason: String },

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
