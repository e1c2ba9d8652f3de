//! A stand-in media player that plays at 1x from a chosen start.

use async_trait::async_trait;
use lyricsync_core::{CoreError, LyricsDocument, PlaybackClock, PlaybackSource, Result};
use std::time::Duration;
use tokio::sync::Mutex;

/// Time the simulated track keeps playing after its last timed line
const TRAILING_SILENCE: Duration = Duration::from_secs(5);

pub struct SimulatedPlayback {
    clock: Mutex<PlaybackClock>,
}

impl SimulatedPlayback {
    #[must_use]
    pub fn new(start: Duration, duration: Duration) -> Self {
        Self {
            clock: Mutex::new(PlaybackClock::new(true, start.min(duration), duration)),
        }
    }

    /// Track length for `document`: the `[length:]` tag when present,
    /// otherwise a little past the last timed line.
    #[must_use]
    pub fn track_length(document: &LyricsDocument) -> Duration {
        if let Some(length) = document.metadata.length {
            return length;
        }
        let last_ms = document
            .lines
            .iter()
            .filter(|line| !line.is_sentinel())
            .map(|line| line.start_time_ms)
            .max()
            .unwrap_or(0);
        Duration::from_millis(u64::try_from(last_ms).unwrap_or(0)) + TRAILING_SILENCE
    }

    pub async fn is_finished(&self) -> bool {
        self.clock.lock().await.is_finished()
    }
}

#[async_trait]
impl PlaybackSource for SimulatedPlayback {
    async fn position_ms(&self) -> i64 {
        self.clock.lock().await.position_ms()
    }

    async fn seek_to(&self, position_ms: i64) -> Result<()> {
        let target = u64::try_from(position_ms).map_err(|_| CoreError::SeekFailed {
            reason: format!("negative position {position_ms}ms"),
        })?;
        self.clock.lock().await.seek(Duration::from_millis(target));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_plays_from_start_offset() {
        let playback = SimulatedPlayback::new(Duration::from_secs(10), Duration::from_secs(60));
        tokio::time::advance(Duration::from_millis(1500)).await;
        assert_eq!(playback.position_ms().await, 11_500);
        assert!(!playback.is_finished().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_and_reject_negative() {
        let playback = SimulatedPlayback::new(Duration::ZERO, Duration::from_secs(60));
        playback.seek_to(30_000).await.unwrap();
        assert_eq!(playback.position_ms().await, 30_000);
        assert!(playback.seek_to(-1).await.is_err());
    }

    #[test]
    fn test_track_length() {
        let doc = lyricsync_core::parse("[00:10.00]a\n[01:00.00]b");
        assert_eq!(SimulatedPlayback::track_length(&doc), Duration::from_secs(65));

        let tagged = lyricsync_core::parse("[length: 03:20]\n[00:10.00]a");
        assert_eq!(SimulatedPlayback::track_length(&tagged), Duration::from_secs(200));
    }
}
