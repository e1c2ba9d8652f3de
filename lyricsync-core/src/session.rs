use crate::config::{LyricsSyncConfig, Preferences};
use crate::document::{LyricsDocument, LyricsMode};
use crate::error::Result;
use crate::lrc;
use crate::playback::{PlaybackSource, PositionSample};
use crate::resolver::{resolve_for_document, ResolverState};
use crate::romanize::{JobScope, RomanizationPipeline};
use crate::scroll::{FollowScrollController, FollowState, ScrollIntent};
use crate::selection::{LineSelection, SelectionChange};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "lyricsync::session";

/// Events emitted by the lyrics session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A new document replaced the previous one
    DocumentLoaded {
        generation: u64,
        mode: LyricsMode,
        line_count: usize,
    },
    /// The resolved current line changed
    LineChanged {
        generation: u64,
        index: Option<usize>,
    },
    /// The viewport should move
    Scroll(ScrollIntent),
    /// A line's romanized text is now available
    RomanizationReady { generation: u64, index: usize },
    /// Playback jumped after a line tap
    SeekRequested { position_ms: i64 },
    SelectionChanged(SelectionChange),
}

struct SessionInner {
    document: Arc<LyricsDocument>,
    prefs: Preferences,
    resolver: ResolverState,
    controller: FollowScrollController,
    selection: LineSelection,
    lyrics_offset_ms: i64,
    jobs: JobScope,
}

/// Owns the current lyrics document and drives resolution, follow-scroll
/// and romanization for it.
pub struct LyricsSession {
    inner: RwLock<SessionInner>,
    event_tx: broadcast::Sender<SessionEvent>,
    index_tx: watch::Sender<Option<usize>>,
    generation: Arc<AtomicU64>,
    pipeline: RomanizationPipeline,
    playback: Arc<dyn PlaybackSource>,
}

impl LyricsSession {
    /// Create a session with no lyrics loaded yet
    #[must_use]
    pub fn new(config: &LyricsSyncConfig, playback: Arc<dyn PlaybackSource>) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(256);
        let (index_tx, _) = watch::channel(None);
        let generation = Arc::new(AtomicU64::new(0));

        Arc::new(Self {
            inner: RwLock::new(SessionInner {
                document: Arc::new(LyricsDocument::loading()),
                prefs: config.preferences(),
                resolver: ResolverState::default(),
                controller: FollowScrollController::new(&config.scroll),
                selection: LineSelection::new(config.selection.max_lines),
                lyrics_offset_ms: 0,
                jobs: JobScope::new(0, Arc::clone(&generation)),
            }),
            event_tx,
            index_tx,
            generation,
            pipeline: RomanizationPipeline::with_capacity(config.romanization.cache_capacity),
            playback,
        })
    }

    /// Subscribe to session events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Latest resolved line index. Only the newest value is kept.
    #[must_use]
    pub fn watch_index(&self) -> watch::Receiver<Option<usize>> {
        self.index_tx.subscribe()
    }

    #[must_use]
    pub fn playback(&self) -> Arc<dyn PlaybackSource> {
        Arc::clone(&self.playback)
    }

    /// Generation of the current document; bumped on every switch
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub async fn document(&self) -> Arc<LyricsDocument> {
        Arc::clone(&self.inner.read().await.document)
    }

    pub async fn current_index(&self) -> Option<usize> {
        self.inner.read().await.resolver.current_index
    }

    pub async fn follow_state(&self) -> FollowState {
        self.inner.read().await.controller.state()
    }

    /// Parse `raw` and make it the current document.
    pub async fn load_lyrics(&self, raw: &str) -> u64 {
        self.set_document(lrc::parse(raw)).await
    }

    /// Show the loading state while the lyrics source works.
    pub async fn set_loading(&self) -> u64 {
        self.set_document(LyricsDocument::loading()).await
    }

    /// Replace the current document, abandoning work tied to the old one.
    pub async fn set_document(&self, document: LyricsDocument) -> u64 {
        let document = Arc::new(document);
        let mut inner = self.inner.write().await;

        inner.jobs.cancel.cancel();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let jobs = JobScope::new(generation, Arc::clone(&self.generation));

        inner.document = Arc::clone(&document);
        inner.resolver.reset();
        inner.controller.reset();
        inner.selection.clear();
        inner.jobs = jobs.clone();

        self.pipeline
            .spawn(&document, &inner.prefs, &jobs, &self.event_tx);
        drop(inner);

        info!(
            target: LOG_TARGET,
            "Loaded {:?} lyrics with {} lines (generation {})",
            document.mode,
            document.lines.len(),
            generation
        );
        self.index_tx.send_replace(None);
        let _ = self.event_tx.send(SessionEvent::DocumentLoaded {
            generation,
            mode: document.mode,
            line_count: document.lines.len(),
        });
        generation
    }

    /// Apply new preferences. Newly enabled scripts are romanized on the
    /// current document; already filled lines are kept.
    pub async fn set_preferences(&self, prefs: Preferences) {
        let mut inner = self.inner.write().await;
        inner.prefs = prefs;
        inner.controller.set_auto_scroll(prefs.auto_scroll);

        let jobs = inner.jobs.clone();
        let document = Arc::clone(&inner.document);
        self.pipeline.spawn(&document, &prefs, &jobs, &self.event_tx);
    }

    /// Per-track correction added to every sampled position.
    pub async fn set_lyrics_offset(&self, offset_ms: i64) {
        self.inner.write().await.lyrics_offset_ms = offset_ms;
        debug!(target: LOG_TARGET, "Lyrics offset set to {}ms", offset_ms);
    }

    /// Wait until every romanization job for the current document has
    /// finished or been discarded, including jobs added by preference
    /// changes.
    pub async fn romanization_idle(&self) {
        let jobs = self.inner.read().await.jobs.clone();
        jobs.wait().await;
    }

    /// Resolve one playback sample. Returns the current line index.
    pub async fn tick(&self, sample: PositionSample) -> Option<usize> {
        let now = Instant::now();
        let mut inner = self.inner.write().await;

        let position_ms = sample.effective_ms().saturating_add(inner.lyrics_offset_ms);
        let index = resolve_for_document(&inner.document, position_ms);
        let seeking = sample.is_seeking();
        let changed = inner.resolver.update(index, seeking);
        let intent = inner.controller.on_index(index, seeking, now);
        drop(inner);

        if changed {
            self.index_tx.send_replace(index);
            let _ = self.event_tx.send(SessionEvent::LineChanged {
                generation: self.generation(),
                index,
            });
        }
        if let Some(intent) = intent {
            let _ = self.event_tx.send(SessionEvent::Scroll(intent));
        }
        index
    }

    /// Resume auto-follow if a manual override lapsed without a line change.
    pub async fn poll_override(&self) {
        let intent = self.inner.write().await.controller.poll_override(Instant::now());
        if let Some(intent) = intent {
            let _ = self.event_tx.send(SessionEvent::Scroll(intent));
        }
    }

    /// The user dragged the lyrics viewport.
    pub async fn manual_scroll(&self) {
        self.inner
            .write()
            .await
            .controller
            .on_manual_scroll(Instant::now());
    }

    /// Tap on a line: toggles it in selection mode, otherwise seeks to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the playback collaborator rejects the seek.
    pub async fn tap_line(&self, index: usize) -> Result<()> {
        let mut inner = self.inner.write().await;

        if inner.selection.is_active() {
            let document = Arc::clone(&inner.document);
            let change = inner.selection.toggle(index, &document);
            drop(inner);
            let _ = self.event_tx.send(SessionEvent::SelectionChanged(change));
            return Ok(());
        }

        if !inner.prefs.tap_to_seek || !inner.document.mode.is_synced() {
            return Ok(());
        }
        let Some(start_ms) = inner
            .document
            .line(index)
            .filter(|line| !line.is_sentinel())
            .map(|line| line.start_time_ms)
        else {
            return Ok(());
        };

        let target_ms = start_ms.saturating_sub(inner.lyrics_offset_ms).max(0);
        let generation = inner.jobs.generation;
        drop(inner);

        debug!(target: LOG_TARGET, "Seeking to line {} at {}ms", index, target_ms);
        if let Err(e) = self.playback.seek_to(target_ms).await {
            warn!(target: LOG_TARGET, "Seek to {}ms failed: {}", target_ms, e);
            return Err(e);
        }

        let mut inner = self.inner.write().await;
        if inner.jobs.generation != generation {
            debug!(target: LOG_TARGET, "Document changed during seek, not scrolling");
            return Ok(());
        }
        let intent = inner.controller.on_line_tap(index);
        drop(inner);

        let _ = self.event_tx.send(SessionEvent::SeekRequested {
            position_ms: target_ms,
        });
        let _ = self.event_tx.send(SessionEvent::Scroll(intent));
        Ok(())
    }

    /// Long-press on a line: enters selection mode with it, or adds it to
    /// the running selection.
    pub async fn long_press_line(&self, index: usize) -> SelectionChange {
        let mut inner = self.inner.write().await;
        let document = Arc::clone(&inner.document);
        let change = inner.selection.long_press(index, &document);
        drop(inner);

        let _ = self.event_tx.send(SessionEvent::SelectionChanged(change));
        change
    }

    pub async fn clear_selection(&self) {
        let mut inner = self.inner.write().await;
        if inner.selection.is_active() {
            inner.selection.clear();
            drop(inner);
            let _ = self
                .event_tx
                .send(SessionEvent::SelectionChanged(SelectionChange::Exited));
        }
    }

    pub async fn is_selecting(&self) -> bool {
        self.inner.read().await.selection.is_active()
    }

    /// Selected lines joined for sharing, in document order
    pub async fn selected_text(&self) -> String {
        let inner = self.inner.read().await;
        inner.selection.selected_text(&inner.document)
    }

    pub async fn app_backgrounded(&self) {
        self.inner.write().await.controller.on_background();
        debug!(target: LOG_TARGET, "App backgrounded");
    }

    pub async fn app_foregrounded(&self) {
        let intent = self.inner.write().await.controller.on_foreground();
        debug!(target: LOG_TARGET, "App foregrounded");
        if let Some(intent) = intent {
            let _ = self.event_tx.send(SessionEvent::Scroll(intent));
        }
    }
}
