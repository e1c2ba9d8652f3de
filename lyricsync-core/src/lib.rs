pub mod config;
pub mod document;
pub mod error;
pub mod lrc;
pub mod paths;
pub mod playback;
pub mod resolver;
pub mod romanize;
pub mod script;
pub mod scroll;
pub mod selection;
pub mod session;
pub mod ticker;

pub use config::{
    CyrillicConfig, LoggingConfig, LyricsSyncConfig, Preferences, RomanizationConfig,
    ScrollConfig, ScrollDurations, SelectionConfig, CONFIG_TEMPLATE,
};

/// Re-export toml error type for config parsing error handling
pub use toml::de::Error as TomlParseError;
pub use document::{
    DocumentSnapshot, LineSnapshot, LrcMetadata, LyricLine, LyricWord, LyricsDocument, LyricsMode,
    SENTINEL_START_MS,
};
pub use error::{CoreError, Result};
pub use lrc::{parse, LYRICS_NOT_FOUND};
pub use paths::{config_dir, config_path, log_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME, LOG_FILE_NAME};
pub use playback::{PlaybackClock, PlaybackSource, PositionSample};
pub use resolver::{resolve_current_index, resolve_for_document, ResolverState};
pub use romanize::{
    document_cyrillic, kind_for, romanize, CyrillicLanguage, JobScope, RomanizationKind,
    RomanizationPipeline, DEFAULT_CACHE_CAPACITY,
};
pub use script::{classify, is_chinese, is_japanese, is_korean, Script};
pub use scroll::{FollowScrollController, FollowState, ScrollIntent, ScrollMode};
pub use selection::{concat_lines, LineSelection, SelectionChange};
pub use session::{LyricsSession, SessionEvent};
pub use ticker::{run_ticker, spawn_ticker};
