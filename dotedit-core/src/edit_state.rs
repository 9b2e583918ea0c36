//! Per-document edit state: live content, saved baseline, and bounded history.

use std::mem;

use crate::history::History;

/// Edit state for one document.
///
/// `is_modified` is always `content != original_content`. It is recomputed by
/// [`EditState::recompute`] after every mutation and never assigned from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    content: String,
    original_content: String,
    undo: History,
    redo: History,
    is_modified: bool,
}

impl EditState {
    /// Seeds a fresh state from freshly fetched content.
    pub fn new(content: String) -> Self {
        Self {
            original_content: content.clone(),
            content,
            undo: History::new(),
            redo: History::new(),
            is_modified: false,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn original_content(&self) -> &str {
        &self.original_content
    }

    pub fn undo_history(&self) -> &History {
        &self.undo
    }

    pub fn redo_history(&self) -> &History {
        &self.redo
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// True when nothing about this state is worth keeping once it loses focus.
    pub fn is_pristine(&self) -> bool {
        !self.is_modified && self.undo.is_empty() && self.redo.is_empty()
    }

    /// Replaces the content, recording the previous value for undo.
    ///
    /// Identical writes are ignored so they never pollute the history.
    /// Returns whether anything changed.
    pub fn update(&mut self, new_content: String) -> bool {
        if new_content == self.content {
            return false;
        }
        let previous = mem::replace(&mut self.content, new_content);
        self.undo.push_back(previous);
        self.redo.clear();
        self.recompute();
        true
    }

    /// Steps back one snapshot. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };
        let current = mem::replace(&mut self.content, previous);
        self.redo.push_front(current);
        self.recompute();
        true
    }

    /// Re-applies the most recently undone snapshot.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop_front() else {
            return false;
        };
        let current = mem::replace(&mut self.content, next);
        self.undo.push_back(current);
        self.recompute();
        true
    }

    /// Discards all pending work and returns to the saved baseline.
    pub fn revert(&mut self) {
        self.content.clone_from(&self.original_content);
        self.undo.clear();
        self.redo.clear();
        self.is_modified = false;
    }

    /// Records that `saved` was persisted.
    ///
    /// `saved` is the content captured when the save was issued. Edits made
    /// while the save was in flight are kept: the state stays modified with its
    /// history intact, and only a clean result clears the history.
    pub fn mark_saved(&mut self, saved: &str) {
        saved.clone_into(&mut self.original_content);
        if self.content == self.original_content {
            self.undo.clear();
            self.redo.clear();
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        self.is_modified = self.content != self.original_content;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HISTORY_LIMIT;

    #[test]
    fn modified_tracks_equality_with_baseline() {
        let mut s = EditState::new("a".into());
        for next in ["ab", "a", "abc", "", "a"] {
            s.update(next.into());
            assert_eq!(s.is_modified(), s.content() != s.original_content());
        }
        assert!(!s.is_modified(), "typing back to the baseline is not a modification");
    }

    #[test]
    fn identical_update_is_noop() {
        let mut s = EditState::new("a".into());
        s.update("ab".into());
        s.undo();
        let before = s.clone();
        assert!(!s.update("a".into()));
        assert_eq!(s, before, "redo history must survive an identical write");
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut s = EditState::new("a".into());
        s.update("ab".into());
        assert!(s.undo());
        assert_eq!(s.content(), "a");
        assert!(s.redo());
        assert_eq!(s.content(), "ab");
        assert!(s.is_modified());
        assert!(!s.redo(), "redo history should be exhausted");
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut s = EditState::new("a".into());
        s.update("ab".into());
        s.update("abc".into());
        s.undo();
        assert_eq!(s.redo_history().len(), 1);
        s.update("abx".into());
        assert!(s.redo_history().is_empty());
        assert_eq!(s.undo_history().to_vec(), vec!["a", "ab"]);
    }

    #[test]
    fn undo_history_caps_at_limit() {
        let mut s = EditState::new(String::new());
        for i in 0..=HISTORY_LIMIT {
            s.update(format!("v{i}"));
        }
        assert_eq!(s.undo_history().len(), HISTORY_LIMIT);
        assert_eq!(
            s.undo_history().iter().next(),
            Some("v0"),
            "the empty seed is the evicted entry"
        );
    }

    #[test]
    fn revert_resets_everything() {
        let mut s = EditState::new("base".into());
        s.update("x".into());
        s.update("y".into());
        s.undo();
        s.revert();
        assert_eq!(s.content(), "base");
        assert!(s.undo_history().is_empty());
        assert!(s.redo_history().is_empty());
        assert!(!s.is_modified());
        assert!(s.is_pristine());
    }

    #[test]
    fn mark_saved_keeps_edits_made_in_flight() {
        let mut s = EditState::new("a".into());
        s.update("ab".into());
        let issued = s.content().to_owned();
        s.update("abc".into());
        s.mark_saved(&issued);
        assert_eq!(s.original_content(), "ab");
        assert!(s.is_modified());
        assert_eq!(s.undo_history().len(), 2);

        s.mark_saved("abc");
        assert!(s.is_pristine());
    }
}
