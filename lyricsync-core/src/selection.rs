//! Multi-line selection for sharing a lyrics snippet.

use crate::document::LyricsDocument;
use std::collections::BTreeSet;

/// Outcome of a selection gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    /// Selection mode started with this line
    Entered(usize),
    Added(usize),
    Removed(usize),
    /// The last selected line was removed
    Exited,
    /// Adding would exceed the limit; nothing changed
    LimitReached { max: usize },
    /// The gesture does not apply (out of range, already selected, or not in
    /// selection mode)
    Ignored,
}

#[derive(Debug, Clone)]
pub struct LineSelection {
    max_lines: usize,
    selected: BTreeSet<usize>,
    active: bool,
}

impl LineSelection {
    #[must_use]
    pub const fn new(max_lines: usize) -> Self {
        Self {
            max_lines,
            selected: BTreeSet::new(),
            active: false,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Selected indices in document order
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Long-press: enter selection mode with `index`, or add it when already
    /// selecting. A long-press never removes a line.
    pub fn long_press(&mut self, index: usize, document: &LyricsDocument) -> SelectionChange {
        if !Self::selectable(index, document) || self.contains(index) {
            return SelectionChange::Ignored;
        }
        if !self.active {
            self.active = true;
            self.selected.insert(index);
            return SelectionChange::Entered(index);
        }
        self.add(index)
    }

    /// Tap while selecting toggles the line.
    pub fn toggle(&mut self, index: usize, document: &LyricsDocument) -> SelectionChange {
        if !self.active || !Self::selectable(index, document) {
            return SelectionChange::Ignored;
        }

        if self.selected.remove(&index) {
            if self.selected.is_empty() {
                self.active = false;
                return SelectionChange::Exited;
            }
            return SelectionChange::Removed(index);
        }

        self.add(index)
    }

    fn add(&mut self, index: usize) -> SelectionChange {
        if self.selected.len() >= self.max_lines {
            return SelectionChange::LimitReached {
                max: self.max_lines,
            };
        }
        self.selected.insert(index);
        SelectionChange::Added(index)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.active = false;
    }

    /// Text of the selected lines, joined with newlines.
    #[must_use]
    pub fn selected_text(&self, document: &LyricsDocument) -> String {
        concat_lines(document, self.indices())
    }

    fn selectable(index: usize, document: &LyricsDocument) -> bool {
        document.line(index).is_some_and(|line| !line.is_sentinel())
    }
}

/// Concatenate the text of `indices` in document order, skipping the
/// sentinel head and out-of-range indices.
pub fn concat_lines(document: &LyricsDocument, indices: impl IntoIterator<Item = usize>) -> String {
    let ordered: BTreeSet<usize> = indices.into_iter().collect();
    ordered
        .into_iter()
        .filter_map(|i| document.line(i))
        .filter(|line| !line.is_sentinel())
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
