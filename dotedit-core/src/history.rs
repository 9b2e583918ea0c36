//! Bounded snapshot history backing undo and redo.

use std::collections::VecDeque;

/// Maximum number of snapshots kept in either direction.
pub const HISTORY_LIMIT: usize = 50;

/// A bounded sequence of content snapshots.
///
/// The undo side treats the back as most recent and evicts from the front;
/// the redo side treats the front as most recent and evicts from the back.
/// Both directions share this type so the cap is enforced in one place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `snapshot` as the newest entry, evicting the oldest on overflow.
    pub fn push_back(&mut self, snapshot: String) {
        self.entries.push_back(snapshot);
        if self.entries.len() > HISTORY_LIMIT {
            self.entries.pop_front();
        }
    }

    /// Inserts `snapshot` at the front, dropping the tail on overflow.
    pub fn push_front(&mut self, snapshot: String) {
        self.entries.push_front(snapshot);
        if self.entries.len() > HISTORY_LIMIT {
            self.entries.pop_back();
        }
    }

    pub fn pop_back(&mut self) -> Option<String> {
        self.entries.pop_back()
    }

    pub fn pop_front(&mut self) -> Option<String> {
        self.entries.pop_front()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Copies the snapshots out in front-to-back order.
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_back_evicts_oldest() {
        let mut h = History::new();
        for i in 0..=HISTORY_LIMIT {
            h.push_back(i.to_string());
        }
        assert_eq!(h.len(), HISTORY_LIMIT);
        assert_eq!(h.iter().next(), Some("1"), "entry 0 should have been evicted");
        assert_eq!(h.pop_back().as_deref(), Some("50"));
    }

    #[test]
    fn push_front_drops_tail() {
        let mut h = History::new();
        for i in 0..=HISTORY_LIMIT {
            h.push_front(i.to_string());
        }
        assert_eq!(h.len(), HISTORY_LIMIT);
        assert_eq!(h.pop_front().as_deref(), Some("50"));
        assert_eq!(h.iter().last(), Some("1"), "entry 0 should have been dropped");
    }
}
