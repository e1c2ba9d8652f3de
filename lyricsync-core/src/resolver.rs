//! Maps a playback position to the active lyric line.

use crate::document::{LyricLine, LyricsDocument};

/// Index of the last line whose start time is at or before `position_ms`.
///
/// Lines must be sorted by start time. Ties resolve to the last entry in
/// document order. Returns `None` when the position precedes every line,
/// which cannot happen for a synced document because of its sentinel head.
#[must_use]
pub fn resolve_current_index(lines: &[LyricLine], position_ms: i64) -> Option<usize> {
    lines
        .partition_point(|line| line.start_time_ms <= position_ms)
        .checked_sub(1)
}

/// Like [`resolve_current_index`], but only synced documents have a current
/// line. Everything else resolves to `None`.
#[must_use]
pub fn resolve_for_document(document: &LyricsDocument, position_ms: i64) -> Option<usize> {
    if !document.mode.is_synced() {
        return None;
    }
    resolve_current_index(&document.lines, position_ms)
}

/// What the resolver saw on the last tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverState {
    pub current_index: Option<usize>,
    pub previous_index: Option<usize>,
    pub is_seeking: bool,
}

impl ResolverState {
    /// Record a new resolution. Returns `true` if the current line changed.
    pub fn update(&mut self, index: Option<usize>, is_seeking: bool) -> bool {
        self.previous_index = self.current_index;
        self.current_index = index;
        self.is_seeking = is_seeking;
        self.previous_index != self.current_index
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lrc;

    fn hello_world() -> LyricsDocument {
        lrc::parse("[00:01.00]Hello\n[00:03.50]World")
    }

    #[test]
    fn test_scenario_positions() {
        let doc = hello_world();
        assert_eq!(resolve_for_document(&doc, 2000), Some(1));
        assert_eq!(doc.lines[1].text, "Hello");
        assert_eq!(resolve_for_document(&doc, 500), Some(0));
        assert!(doc.lines[0].is_sentinel());
        assert_eq!(resolve_for_document(&doc, 9999), Some(2));
        assert_eq!(doc.lines[2].text, "World");
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let doc = hello_world();
        assert_eq!(resolve_for_document(&doc, 999), Some(0));
        assert_eq!(resolve_for_document(&doc, 1000), Some(1));
        assert_eq!(resolve_for_document(&doc, 3499), Some(1));
        assert_eq!(resolve_for_document(&doc, 3500), Some(2));
    }

    #[test]
    fn test_monotonic_and_idempotent() {
        let doc = lrc::parse("[00:01.00]a\n[00:02.00]b\n[00:02.00]c\n[00:05.00]d\n[01:00.00]e");
        let mut last = None;
        for position in (-1000..70_000).step_by(250) {
            let index = resolve_for_document(&doc, position);
            assert!(index >= last, "regressed at {position}");
            assert_eq!(index, resolve_for_document(&doc, position));
            last = index;
        }
    }

    #[test]
    fn test_duplicate_timestamps_resolve_to_last() {
        let doc = lrc::parse("[00:01.00][00:02.00]chorus\n[00:02.00]verse");
        // sentinel, chorus@1000, chorus@2000, verse@2000
        assert_eq!(resolve_for_document(&doc, 2000), Some(3));
        assert_eq!(doc.lines[3].text, "verse");
    }

    #[test]
    fn test_unsynced_documents_resolve_to_none() {
        assert_eq!(resolve_for_document(&lrc::parse("Line A\nLine B"), 5000), None);
        assert_eq!(resolve_for_document(&LyricsDocument::not_found(), 0), None);
        assert_eq!(resolve_for_document(&LyricsDocument::loading(), 0), None);
    }

    #[test]
    fn test_without_sentinel_before_first_line() {
        let lines = vec![LyricLine::new(1000, "a")];
        assert_eq!(resolve_current_index(&lines, 0), None);
        assert_eq!(resolve_current_index(&[], 0), None);
    }

    #[test]
    fn test_state_update_reports_changes() {
        let mut state = ResolverState::default();
        assert!(state.update(Some(0), false));
        assert!(!state.update(Some(0), false));
        assert!(state.update(Some(1), true));
        assert_eq!(state.previous_index, Some(0));
        assert!(state.is_seeking);
        state.reset();
        assert_eq!(state, ResolverState::default());
    }
}
