//! Background transliteration of lyric lines.
//!
//! Each eligible line gets its own task. A task writes into the line's
//! write-once slot only if its document is still the current one, then
//! announces the fill on the session event channel.

mod chinese;
mod cyrillic;
mod japanese;
mod korean;

pub use cyrillic::CyrillicLanguage;

use crate::config::Preferences;
use crate::document::LyricsDocument;
use crate::error::{CoreError, Result};
use crate::script::{classify, Script};
use crate::session::SessionEvent;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, trace};

const LOG_TARGET: &str = "lyricsync::romanize";

/// Which transliteration applies to a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RomanizationKind {
    Japanese,
    Korean,
    Chinese,
    Cyrillic(CyrillicLanguage),
}

impl RomanizationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Japanese => "japanese",
            Self::Korean => "korean",
            Self::Chinese => "chinese",
            Self::Cyrillic(language) => language.as_str(),
        }
    }
}

impl fmt::Display for RomanizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cyrillic language of a whole document, used when Cyrillic detection is
/// not done line by line. `None` when no enabled language covers every
/// Cyrillic letter of the document.
#[must_use]
pub fn document_cyrillic(document: &LyricsDocument, prefs: &Preferences) -> Option<CyrillicLanguage> {
    if prefs.cyrillic.by_line || !prefs.cyrillic.any_enabled() {
        return None;
    }
    let text: String = document
        .lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    CyrillicLanguage::detect(&text, |language| prefs.cyrillic.enabled(language))
}

/// Decide whether `text` should be romanized under `prefs`, and how.
///
/// `document_language` is the result of [`document_cyrillic`] for the
/// line's document; it is ignored when Cyrillic is detected line by line.
#[must_use]
pub fn kind_for(
    text: &str,
    prefs: &Preferences,
    document_language: Option<CyrillicLanguage>,
) -> Option<RomanizationKind> {
    match classify(text) {
        Script::Japanese if prefs.romanize_japanese => Some(RomanizationKind::Japanese),
        Script::Korean if prefs.romanize_korean => Some(RomanizationKind::Korean),
        Script::Chinese if prefs.romanize_chinese => Some(RomanizationKind::Chinese),
        Script::Other if text.chars().any(cyrillic::is_cyrillic) => {
            let language = if prefs.cyrillic.by_line {
                CyrillicLanguage::detect(text, |language| prefs.cyrillic.enabled(language))
            } else {
                document_language
            };
            language.map(RomanizationKind::Cyrillic)
        }
        _ => None,
    }
}

/// Transliterate `text` as `kind`.
///
/// # Errors
///
/// Returns [`CoreError::RomanizationFailed`] when the line has nothing the
/// transliterator can handle.
pub fn romanize(kind: RomanizationKind, text: &str) -> Result<String> {
    let output = match kind {
        RomanizationKind::Japanese => japanese::romanize(text),
        RomanizationKind::Korean => korean::romanize(text),
        RomanizationKind::Chinese => chinese::romanize(text),
        RomanizationKind::Cyrillic(language) => cyrillic::romanize(language, text),
    };

    output
        .filter(|s| !s.trim().is_empty() && s != text)
        .ok_or_else(|| CoreError::RomanizationFailed {
            script: kind,
            reason: "no transliterable characters".to_string(),
        })
}

type CacheKey = (RomanizationKind, String);

/// Least-recently-used memo of romanized lines
struct RomanizationCache {
    entries: HashMap<CacheKey, String>,
    lru: VecDeque<CacheKey>,
    capacity: usize,
}

impl RomanizationCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn get(&mut self, key: &CacheKey) -> Option<String> {
        let hit = self.entries.get(key).cloned()?;
        self.touch(key.clone());
        Some(hit)
    }

    fn insert(&mut self, key: CacheKey, value: String) {
        self.entries.insert(key.clone(), value);
        self.touch(key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.entries.remove(&old);
            }
        }
    }

    fn touch(&mut self, key: CacheKey) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }
}

/// Schedules romanization jobs and memoises their results.
///
/// Cloning shares the cache.
#[derive(Clone)]
pub struct RomanizationPipeline {
    cache: Arc<Mutex<RomanizationCache>>,
}

impl Default for RomanizationPipeline {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

/// Cached lines kept when no capacity is configured
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// The document a batch of jobs belongs to, and the tracker its jobs run on.
///
/// Every spawn for the same document shares one tracker, so waiting on it
/// covers jobs scheduled by later preference changes too.
#[derive(Clone)]
pub struct JobScope {
    pub generation: u64,
    pub current_generation: Arc<AtomicU64>,
    pub cancel: CancellationToken,
    pub tracker: TaskTracker,
}

impl JobScope {
    #[must_use]
    pub fn new(generation: u64, current_generation: Arc<AtomicU64>) -> Self {
        let tracker = TaskTracker::new();
        tracker.close();
        Self {
            generation,
            current_generation,
            cancel: CancellationToken::new(),
            tracker,
        }
    }

    fn is_stale(&self) -> bool {
        self.cancel.is_cancelled()
            || self.current_generation.load(Ordering::Acquire) != self.generation
    }

    /// Resolves once every job spawned in this scope has finished.
    pub async fn wait(&self) {
        self.tracker.wait().await;
    }
}

impl RomanizationPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline whose cache keeps at most `capacity` lines.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: Arc::new(Mutex::new(RomanizationCache::new(capacity))),
        }
    }

    /// Romanize with memoisation. Failures are not cached.
    ///
    /// # Errors
    ///
    /// Propagates [`CoreError::RomanizationFailed`] from [`romanize`].
    pub async fn romanize_cached(&self, kind: RomanizationKind, text: &str) -> Result<String> {
        let key = (kind, text.to_string());
        if let Some(hit) = self.cache.lock().await.get(&key) {
            trace!(target: LOG_TARGET, "Cache hit for {} line", kind);
            return Ok(hit);
        }

        let value = romanize(kind, text)?;
        self.cache.lock().await.insert(key, value.clone());
        Ok(value)
    }

    pub async fn cached_len(&self) -> usize {
        self.cache.lock().await.entries.len()
    }

    /// Spawn one job per eligible line of `document` on the scope's tracker.
    ///
    /// The tracker is closed again afterwards, so [`JobScope::wait`]
    /// resolves once every job has either written its slot or been
    /// discarded.
    pub fn spawn(
        &self,
        document: &Arc<LyricsDocument>,
        prefs: &Preferences,
        scope: &JobScope,
        events: &broadcast::Sender<SessionEvent>,
    ) {
        let document_language = document_cyrillic(document, prefs);
        if let Some(language) = document_language {
            debug!(target: LOG_TARGET, "Document {} detected as {}", scope.generation, language);
        }

        scope.tracker.reopen();
        let mut scheduled = 0usize;

        for (index, line) in document.lines.iter().enumerate() {
            if line.romanized_text().is_some() {
                continue;
            }
            let Some(kind) = kind_for(&line.text, prefs, document_language) else {
                continue;
            };

            let pipeline = self.clone();
            let document = Arc::clone(document);
            let job_scope = scope.clone();
            let events = events.clone();
            scheduled += 1;

            scope.tracker.spawn(async move {
                let scope = job_scope;
                if scope.is_stale() {
                    return;
                }
                let Some(text) = document.line(index).map(|l| l.text.clone()) else {
                    return;
                };

                match pipeline.romanize_cached(kind, &text).await {
                    Ok(value) => {
                        if scope.is_stale() {
                            debug!(
                                target: LOG_TARGET,
                                "Discarding line {} from superseded document {}", index, scope.generation
                            );
                            return;
                        }
                        let filled = document.line(index).is_some_and(|l| l.fill_romanized(value));
                        // The document may have been replaced while writing
                        if filled && !scope.is_stale() {
                            let _ = events.send(SessionEvent::RomanizationReady {
                                generation: scope.generation,
                                index,
                            });
                        }
                    }
                    Err(e) => debug!(target: LOG_TARGET, "Line {} left unromanized: {}", index, e),
                }
            });
        }

        scope.tracker.close();
        debug!(
            target: LOG_TARGET,
            "Scheduled {} romanization jobs for document {}",
            scheduled,
            scope.generation
        );
    }
}
