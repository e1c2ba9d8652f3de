//! Periodic sampling of the playback position.

use crate::session::LyricsSession;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const LOG_TARGET: &str = "lyricsync::ticker";

/// Sample the session's playback source every `interval` and feed the
/// result to [`LyricsSession::tick`] until `cancel_token` fires.
///
/// Late ticks are skipped rather than bunched up: only the newest position
/// matters to the resolver.
pub async fn run_ticker(
    session: Arc<LyricsSession>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    info!(target: LOG_TARGET, "Sampling playback every {}ms", interval.as_millis());

    let playback = session.playback();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => {
                debug!(target: LOG_TARGET, "Ticker shutting down");
                break;
            }
            _ = ticker.tick() => {
                let sample = playback.sample().await;
                session.tick(sample).await;
                session.poll_override().await;
            }
        }
    }
}

/// Start [`run_ticker`] in a background task
#[must_use]
pub fn spawn_ticker(
    session: Arc<LyricsSession>,
    interval: Duration,
    cancel_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_ticker(session, interval, cancel_token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LyricsSyncConfig;
    use crate::error::Result;
    use crate::playback::{PlaybackClock, PlaybackSource};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct ClockPlayback(Mutex<PlaybackClock>);

    #[async_trait]
    impl PlaybackSource for ClockPlayback {
        async fn position_ms(&self) -> i64 {
            self.0.lock().await.position_ms()
        }

        async fn seek_to(&self, position_ms: i64) -> Result<()> {
            let target = Duration::from_millis(u64::try_from(position_ms).unwrap_or(0));
            self.0.lock().await.seek(target);
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_follows_playback_until_cancelled() {
        let clock = PlaybackClock::new(true, Duration::ZERO, Duration::from_secs(10));
        let playback = Arc::new(ClockPlayback(Mutex::new(clock)));
        let session = LyricsSession::new(&LyricsSyncConfig::default(), playback);
        session
            .load_lyrics("[00:01.00]one\n[00:02.00]two\n[00:03.00]three")
            .await;
        let mut index = session.watch_index();

        let cancel = CancellationToken::new();
        let handle = spawn_ticker(Arc::clone(&session), Duration::from_millis(50), cancel.clone());

        tokio::time::sleep(Duration::from_millis(2_510)).await;
        assert_eq!(*index.borrow_and_update(), Some(2));
        assert_eq!(session.document().await.lines[2].text, "two");

        cancel.cancel();
        handle.await.unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!index.has_changed().unwrap());
    }
}
