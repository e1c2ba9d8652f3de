use serde::Serialize;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Reserved start time of the sentinel head entry.
///
/// Every real timestamp is `>= 0`, so positions before the first tagged line
/// resolve to the head instead of to nothing.
pub const SENTINEL_START_MS: i64 = i64::MIN;

/// Synthetic spacing between unsynced lines. Only used for ordering.
pub const PLAIN_LINE_STEP_MS: i64 = 100;

/// Kind of lyrics a document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LyricsMode {
    /// Timestamp-tagged lyrics with a sentinel head entry
    Synced,
    /// Untagged text split into lines with synthetic timestamps
    Plain,
    /// The lyrics source reported no lyrics
    NotFound,
    /// Lyrics are being fetched
    Loading,
}

impl LyricsMode {
    #[must_use]
    pub const fn is_synced(self) -> bool {
        matches!(self, Self::Synced)
    }
}

/// LRC metadata from ID tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LrcMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub author: Option<String>,
    pub length: Option<Duration>,
    pub offset_ms: i64, // can be negative
}

/// Word-level timing attached to a synced line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LyricWord {
    pub text: String,
    /// Seconds from track start
    pub start_secs: f64,
    /// Seconds from track start
    pub end_secs: f64,
}

/// A single lyric entry.
///
/// `text` and `start_time_ms` never change after parsing. The romanized slot
/// is write-once: it goes from absent to present and is never cleared.
#[derive(Debug, Clone, Default)]
pub struct LyricLine {
    pub start_time_ms: i64,
    pub text: String,
    pub words: Option<Vec<LyricWord>>,
    romanized: OnceCell<String>,
}

impl LyricLine {
    pub fn new(start_time_ms: i64, text: impl Into<String>) -> Self {
        Self {
            start_time_ms,
            text: text.into(),
            words: None,
            romanized: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn with_words(mut self, words: Vec<LyricWord>) -> Self {
        self.words = Some(words);
        self
    }

    /// The synthetic head entry preceding the first timed line.
    #[must_use]
    pub fn sentinel() -> Self {
        Self::new(SENTINEL_START_MS, "")
    }

    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        self.start_time_ms == SENTINEL_START_MS
    }

    /// Transliteration of this line, if one has been published.
    #[must_use]
    pub fn romanized_text(&self) -> Option<&str> {
        self.romanized.get().map(String::as_str)
    }

    /// Publish the transliteration. Returns `false` if one was already set.
    pub(crate) fn fill_romanized(&self, value: String) -> bool {
        self.romanized.set(value).is_ok()
    }
}

// Romanization is asynchronous and not part of a line's identity.
impl PartialEq for LyricLine {
    fn eq(&self, other: &Self) -> bool {
        self.start_time_ms == other.start_time_ms
            && self.text == other.text
            && self.words == other.words
    }
}

/// Parsed lyrics for one track
#[derive(Debug, Clone, PartialEq)]
pub struct LyricsDocument {
    pub mode: LyricsMode,
    pub metadata: LrcMetadata,
    pub lines: Vec<LyricLine>,
}

impl LyricsDocument {
    #[must_use]
    pub const fn empty(mode: LyricsMode) -> Self {
        Self {
            mode,
            metadata: LrcMetadata {
                title: None,
                artist: None,
                album: None,
                author: None,
                length: None,
                offset_ms: 0,
            },
            lines: Vec::new(),
        }
    }

    #[must_use]
    pub const fn not_found() -> Self {
        Self::empty(LyricsMode::NotFound)
    }

    #[must_use]
    pub const fn loading() -> Self {
        Self::empty(LyricsMode::Loading)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn line(&self, index: usize) -> Option<&LyricLine> {
        self.lines.get(index)
    }

    /// Snapshot of the document for serialization, including any romanized
    /// text published so far.
    #[must_use]
    pub fn snapshot(&self) -> DocumentSnapshot<'_> {
        DocumentSnapshot {
            mode: self.mode,
            metadata: &self.metadata,
            lines: self
                .lines
                .iter()
                .map(|line| LineSnapshot {
                    start_time_ms: (!line.is_sentinel()).then_some(line.start_time_ms),
                    text: &line.text,
                    romanized_text: line.romanized_text(),
                    words: line.words.as_deref(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentSnapshot<'a> {
    pub mode: LyricsMode,
    pub metadata: &'a LrcMetadata,
    pub lines: Vec<LineSnapshot<'a>>,
}

#[derive(Debug, Serialize)]
pub struct LineSnapshot<'a> {
    /// `None` for the sentinel head entry
    pub start_time_ms: Option<i64>,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub romanized_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<&'a [LyricWord]>,
}
