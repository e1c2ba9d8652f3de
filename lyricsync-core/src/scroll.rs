//! Follow-scroll policy.
//!
//! [`FollowScrollController`] turns resolver updates and raw interaction
//! events into [`ScrollIntent`]s. It never touches the viewport itself; the
//! renderer executes intents with its own easing.
//!
//! Every intent targets the line *before* the current one so that the
//! previous, current and next lines end up centered together.

use crate::config::{ScrollConfig, ScrollDurations};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

const LOG_TARGET: &str = "lyricsync::scroll";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowState {
    /// No placement yet for this document
    Uninitialized,
    Following,
    /// The position is driven by a scrub in progress
    SeekPreview,
    /// The user scrolled; auto-follow is held until the window lapses
    ManualOverride,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    Initial,
    AutoFollow,
    FastSeek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollIntent {
    pub target_index: usize,
    pub mode: ScrollMode,
    /// Duration class hint for the renderer
    pub duration: Duration,
}

#[derive(Debug)]
pub struct FollowScrollController {
    state: FollowState,
    durations: ScrollDurations,
    preview_window: Duration,
    auto_scroll: bool,
    last_index: Option<usize>,
    override_until: Option<Instant>,
    needs_reinit: bool,
    backgrounded: bool,
}

impl FollowScrollController {
    #[must_use]
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            state: FollowState::Uninitialized,
            durations: config.durations,
            preview_window: config.preview_window(),
            auto_scroll: config.auto_scroll,
            last_index: None,
            override_until: None,
            needs_reinit: false,
            backgrounded: false,
        }
    }

    #[must_use]
    pub const fn state(&self) -> FollowState {
        self.state
    }

    /// When the current manual override lapses, if one is active
    #[must_use]
    pub const fn override_deadline(&self) -> Option<Instant> {
        self.override_until
    }

    pub fn set_auto_scroll(&mut self, enabled: bool) {
        self.auto_scroll = enabled;
    }

    /// Back to [`FollowState::Uninitialized`], as on a document switch.
    pub fn reset(&mut self) {
        debug!(target: LOG_TARGET, "Controller reset");
        self.state = FollowState::Uninitialized;
        self.last_index = None;
        self.override_until = None;
        self.needs_reinit = false;
    }

    /// Feed the latest resolved index.
    pub fn on_index(
        &mut self,
        index: Option<usize>,
        is_seeking: bool,
        now: Instant,
    ) -> Option<ScrollIntent> {
        let previous = self.last_index;
        let changed = index != previous;
        self.last_index = index;

        let index = index?;
        if self.backgrounded {
            return None;
        }

        if is_seeking {
            let entering = self.state != FollowState::SeekPreview;
            self.state = FollowState::SeekPreview;
            self.override_until = None;
            return (entering || changed).then(|| self.intent(index, ScrollMode::FastSeek));
        }

        match self.state {
            FollowState::Uninitialized => {
                self.state = FollowState::Following;
                Some(self.intent(index, ScrollMode::Initial))
            }
            FollowState::SeekPreview => {
                // Scrub released: the view is already near the new line
                self.state = FollowState::Following;
                changed.then(|| self.auto_follow(index)).flatten()
            }
            FollowState::ManualOverride => self.poll_override(now),
            FollowState::Following if !changed => None,
            FollowState::Following => {
                if index == 0 && previous.is_some_and(|p| p > 0) {
                    // Playback restarted from the top
                    Some(self.intent(index, ScrollMode::Initial))
                } else {
                    self.auto_follow(index)
                }
            }
        }
    }

    /// The user dragged the viewport.
    pub fn on_manual_scroll(&mut self, now: Instant) {
        match self.state {
            FollowState::Following | FollowState::ManualOverride => {
                self.state = FollowState::ManualOverride;
                self.override_until = Some(now + self.preview_window);
                trace!(target: LOG_TARGET, "Manual scroll, holding auto-follow");
            }
            FollowState::Uninitialized | FollowState::SeekPreview => {}
        }
    }

    /// Resume following once the manual override window has lapsed.
    pub fn poll_override(&mut self, now: Instant) -> Option<ScrollIntent> {
        if self.state != FollowState::ManualOverride {
            return None;
        }
        if self.override_until.is_some_and(|deadline| now < deadline) {
            return None;
        }

        debug!(target: LOG_TARGET, "Manual override lapsed, resuming follow");
        self.state = FollowState::Following;
        self.override_until = None;
        if self.backgrounded {
            return None;
        }
        self.last_index.and_then(|index| self.auto_follow(index))
    }

    /// A line was tapped outside selection mode and playback is seeking to it.
    pub fn on_line_tap(&mut self, index: usize) -> ScrollIntent {
        self.state = FollowState::Following;
        self.override_until = None;
        // The resolver will land on this line after the seek
        self.last_index = Some(index);
        self.intent(index, ScrollMode::FastSeek)
    }

    pub fn on_background(&mut self) {
        self.backgrounded = true;
        if self.state == FollowState::Following {
            self.needs_reinit = true;
        }
    }

    pub fn on_foreground(&mut self) -> Option<ScrollIntent> {
        self.backgrounded = false;
        let current_out_of_view = self.state == FollowState::ManualOverride;
        if !self.needs_reinit && !current_out_of_view {
            return None;
        }

        debug!(target: LOG_TARGET, "Foregrounded, re-arming initial placement");
        self.needs_reinit = false;
        self.override_until = None;
        self.state = FollowState::Uninitialized;
        let index = self.last_index?;
        self.state = FollowState::Following;
        Some(self.intent(index, ScrollMode::Initial))
    }

    fn auto_follow(&self, index: usize) -> Option<ScrollIntent> {
        self.auto_scroll
            .then(|| self.intent(index, ScrollMode::AutoFollow))
    }

    fn intent(&self, index: usize, mode: ScrollMode) -> ScrollIntent {
        let millis = match mode {
            ScrollMode::Initial => self.durations.initial_ms,
            ScrollMode::AutoFollow => self.durations.auto_follow_ms,
            ScrollMode::FastSeek => self.durations.fast_seek_ms,
        };
        let intent = ScrollIntent {
            target_index: index.saturating_sub(1),
            mode,
            duration: Duration::from_millis(millis),
        };
        trace!(target: LOG_TARGET, "Emitting {:?}", intent);
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> FollowScrollController {
        FollowScrollController::new(&ScrollConfig::default())
    }

    fn feed(c: &mut FollowScrollController, indices: &[usize], now: Instant) -> Vec<ScrollIntent> {
        indices
            .iter()
            .filter_map(|i| c.on_index(Some(*i), false, now))
            .collect()
    }

    #[test]
    fn test_repeated_indices_emit_once_each() {
        let mut c = controller();
        let intents = feed(&mut c, &[0, 0, 1, 1, 2], Instant::now());

        let modes: Vec<_> = intents.iter().map(|i| (i.mode, i.target_index)).collect();
        assert_eq!(
            modes,
            vec![
                (ScrollMode::Initial, 0),
                (ScrollMode::AutoFollow, 0),
                (ScrollMode::AutoFollow, 1),
            ]
        );
        assert_eq!(c.state(), FollowState::Following);
    }

    #[test]
    fn test_target_is_previous_line() {
        let mut c = controller();
        let intent = c.on_index(Some(5), false, Instant::now()).unwrap();
        assert_eq!(intent.target_index, 4);
        assert_eq!(intent.mode, ScrollMode::Initial);
        assert_eq!(intent.duration, Duration::from_millis(800));
    }

    #[test]
    fn test_unresolvable_index_stays_uninitialized() {
        let mut c = controller();
        assert_eq!(c.on_index(None, false, Instant::now()), None);
        assert_eq!(c.state(), FollowState::Uninitialized);
    }

    #[test]
    fn test_seeking_emits_fast_seek_on_each_change() {
        let mut c = controller();
        let now = Instant::now();
        feed(&mut c, &[3], now);

        let entering = c.on_index(Some(3), true, now).unwrap();
        assert_eq!(entering.mode, ScrollMode::FastSeek);
        assert_eq!(entering.duration, Duration::from_millis(500));
        assert_eq!(c.on_index(Some(3), true, now), None);
        assert_eq!(c.on_index(Some(7), true, now).unwrap().target_index, 6);
        assert_eq!(c.on_index(Some(0), true, now).unwrap().target_index, 0);
        assert_eq!(c.state(), FollowState::SeekPreview);
    }

    #[test]
    fn test_seek_release_resumes_without_initial() {
        let mut c = controller();
        let now = Instant::now();
        feed(&mut c, &[3], now);
        c.on_index(Some(8), true, now);

        assert_eq!(c.on_index(Some(8), false, now), None);
        assert_eq!(c.state(), FollowState::Following);
        let next = c.on_index(Some(9), false, now).unwrap();
        assert_eq!(next.mode, ScrollMode::AutoFollow);
    }

    #[test]
    fn test_manual_override_window() {
        let mut c = controller();
        let start = Instant::now();
        feed(&mut c, &[1], start);

        c.on_manual_scroll(start);
        assert_eq!(c.state(), FollowState::ManualOverride);
        assert_eq!(c.on_index(Some(2), false, start + Duration::from_millis(500)), None);

        // A second interaction pushes the deadline out
        c.on_manual_scroll(start + Duration::from_millis(1500));
        assert_eq!(c.poll_override(start + Duration::from_millis(2500)), None);

        let resumed = c.poll_override(start + Duration::from_millis(3500)).unwrap();
        assert_eq!(resumed.mode, ScrollMode::AutoFollow);
        assert_eq!(resumed.target_index, 1);
        assert_eq!(c.state(), FollowState::Following);
        assert_eq!(c.poll_override(start + Duration::from_millis(5000)), None);
    }

    #[test]
    fn test_manual_scroll_ignored_while_seeking() {
        let mut c = controller();
        let now = Instant::now();
        c.on_index(Some(2), true, now);
        c.on_manual_scroll(now);
        assert_eq!(c.state(), FollowState::SeekPreview);
    }

    #[test]
    fn test_line_tap_bypasses_override() {
        let mut c = controller();
        let now = Instant::now();
        feed(&mut c, &[1], now);
        c.on_manual_scroll(now);

        let intent = c.on_line_tap(6);
        assert_eq!(intent.mode, ScrollMode::FastSeek);
        assert_eq!(intent.target_index, 5);
        assert_eq!(c.state(), FollowState::Following);
        // Landing on the tapped line does not scroll again
        assert_eq!(c.on_index(Some(6), false, now), None);
    }

    #[test]
    fn test_auto_scroll_disabled_suppresses_follow_only() {
        let mut c = FollowScrollController::new(&ScrollConfig {
            auto_scroll: false,
            ..ScrollConfig::default()
        });
        let now = Instant::now();
        let intents = feed(&mut c, &[0, 1, 2], now);
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].mode, ScrollMode::Initial);
        assert_eq!(c.on_index(Some(4), true, now).unwrap().mode, ScrollMode::FastSeek);
    }

    #[test]
    fn test_background_rearms_initial() {
        let mut c = controller();
        let now = Instant::now();
        feed(&mut c, &[0, 1], now);

        c.on_background();
        assert_eq!(c.on_index(Some(4), false, now), None);

        let intent = c.on_foreground().unwrap();
        assert_eq!(intent.mode, ScrollMode::Initial);
        assert_eq!(intent.target_index, 3);
        assert_eq!(c.on_index(Some(4), false, now), None);
    }

    #[test]
    fn test_foreground_after_manual_scroll_rearms_initial() {
        let mut c = controller();
        let now = Instant::now();
        feed(&mut c, &[2], now);
        c.on_manual_scroll(now);
        c.on_background();

        assert_eq!(c.on_foreground().unwrap().mode, ScrollMode::Initial);
        assert_eq!(c.override_deadline(), None);
    }

    #[test]
    fn test_foreground_before_placement_is_quiet() {
        let mut c = controller();
        c.on_background();
        assert_eq!(c.on_foreground(), None);
    }

    #[test]
    fn test_restart_from_top_reinitializes() {
        let mut c = controller();
        let intents = feed(&mut c, &[0, 1, 2, 0], Instant::now());
        assert_eq!(intents.last().map(|i| i.mode), Some(ScrollMode::Initial));
    }

    #[test]
    fn test_reset() {
        let mut c = controller();
        let now = Instant::now();
        feed(&mut c, &[0, 1], now);
        c.reset();
        assert_eq!(c.state(), FollowState::Uninitialized);
        assert_eq!(c.on_index(Some(1), false, now).unwrap().mode, ScrollMode::Initial);
    }
}
