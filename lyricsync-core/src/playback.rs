//! The playback collaborator seen from the lyrics engine.

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// One sample of the playback clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionSample {
    /// Position of live playback
    pub position_ms: i64,
    /// Position under a slider drag in progress; drives the resolver
    /// instead of `position_ms` while present
    pub preview_ms: Option<i64>,
}

impl PositionSample {
    #[must_use]
    pub const fn playing(position_ms: i64) -> Self {
        Self {
            position_ms,
            preview_ms: None,
        }
    }

    #[must_use]
    pub const fn previewing(position_ms: i64, preview_ms: i64) -> Self {
        Self {
            position_ms,
            preview_ms: Some(preview_ms),
        }
    }

    #[must_use]
    pub const fn is_seeking(&self) -> bool {
        self.preview_ms.is_some()
    }

    /// The position the resolver should use
    #[must_use]
    pub const fn effective_ms(&self) -> i64 {
        match self.preview_ms {
            Some(preview) => preview,
            None => self.position_ms,
        }
    }
}

/// Media player that the engine samples and can ask to seek.
///
/// The engine never owns the clock: it samples whatever the player reports,
/// which may jump on seek or stand still while paused.
#[async_trait]
pub trait PlaybackSource: Send + Sync {
    /// Current playback position in milliseconds.
    async fn position_ms(&self) -> i64;

    /// Position under an in-progress scrub, if the user is dragging.
    async fn preview_position_ms(&self) -> Option<i64> {
        None
    }

    /// Ask the player to jump to `position_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SeekFailed`](crate::CoreError::SeekFailed) if
    /// the player rejects the request.
    async fn seek_to(&self, position_ms: i64) -> Result<()>;

    async fn sample(&self) -> PositionSample {
        PositionSample {
            position_ms: self.position_ms().await,
            preview_ms: self.preview_position_ms().await,
        }
    }
}

/// Interpolating clock for players that only report their position
/// occasionally.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    pub is_playing: bool,
    /// Position at `updated_at`
    pub position: Duration,
    /// Total track duration
    pub duration: Duration,
    pub updated_at: Instant,
}

impl PlaybackClock {
    #[must_use]
    pub fn new(is_playing: bool, position: Duration, duration: Duration) -> Self {
        Self {
            is_playing,
            position,
            duration,
            updated_at: Instant::now(),
        }
    }

    /// Get interpolated position based on time elapsed since last update
    #[must_use]
    pub fn interpolated_position(&self) -> Duration {
        if !self.is_playing {
            return self.position;
        }

        let elapsed = self.updated_at.elapsed();
        let interpolated = self.position + elapsed;

        // Clamp to track duration
        interpolated.min(self.duration)
    }

    #[must_use]
    pub fn position_ms(&self) -> i64 {
        i64::try_from(self.interpolated_position().as_millis()).unwrap_or(i64::MAX)
    }

    /// Jump to `position`, keeping the play state.
    pub fn seek(&mut self, position: Duration) {
        self.position = position.min(self.duration);
        self.updated_at = Instant::now();
    }

    pub fn set_playing(&mut self, is_playing: bool) {
        self.position = self.interpolated_position();
        self.updated_at = Instant::now();
        self.is_playing = is_playing;
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.interpolated_position() >= self.duration
    }
}
