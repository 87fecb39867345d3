//! Linear undo/redo history.
//!
//! Every committed edit records a full-value `HistorySnapshot`; undo and
//! redo move a cursor over the recorded list. Recording after an undo
//! discards the redo tail. When the list outgrows its limit the oldest
//! snapshots are evicted and the cursor shifts with them.

use tryon_core::model::HistorySnapshot;

pub struct History {
    snapshots: Vec<HistorySnapshot>,
    cursor: usize,
    /// Maximum number of snapshots kept (at least 1).
    limit: usize,
}

impl History {
    /// A history holding one empty snapshot at cursor 0.
    pub fn new(limit: usize) -> Self {
        Self {
            snapshots: vec![HistorySnapshot::default()],
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Record `snapshot` after the cursor and move the cursor onto it.
    pub fn push(&mut self, snapshot: HistorySnapshot) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(snapshot);
        if self.snapshots.len() > self.limit {
            let excess = self.snapshots.len() - self.limit;
            self.snapshots.drain(..excess);
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back one snapshot. `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&HistorySnapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Step forward one snapshot. `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&HistorySnapshot> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Snapshot under the cursor.
    pub fn current(&self) -> &HistorySnapshot {
        &self.snapshots[self.cursor]
    }

    /// Back to a single empty snapshot.
    pub fn reset(&mut self) {
        self.snapshots.clear();
        self.snapshots.push(HistorySnapshot::default());
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tryon_core::model::MaskStroke;

    fn snap(n: usize) -> HistorySnapshot {
        HistorySnapshot {
            annotations: Vec::new(),
            mask_strokes: (0..n).map(|i| MaskStroke::new(i as f32, 0.0, 10.0)).collect(),
        }
    }

    #[test]
    fn starts_with_one_empty_snapshot() {
        let h = History::new(10);
        assert_eq!(h.len(), 1);
        assert_eq!(h.cursor(), 0);
        assert_eq!(h.current(), &HistorySnapshot::default());
        assert!(!h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn undo_redo_walk_the_cursor() {
        let mut h = History::new(10);
        h.push(snap(1));
        h.push(snap(2));
        assert_eq!(h.undo(), Some(&snap(1)));
        assert_eq!(h.undo(), Some(&snap(0)));
        assert_eq!(h.undo(), None);
        assert_eq!(h.cursor(), 0);
        assert_eq!(h.redo(), Some(&snap(1)));
        assert_eq!(h.redo(), Some(&snap(2)));
        assert_eq!(h.redo(), None);
        assert_eq!(h.cursor(), 2);
    }

    #[test]
    fn push_after_undo_drops_redo_tail() {
        let mut h = History::new(10);
        h.push(snap(1));
        h.push(snap(2));
        h.undo();
        h.push(snap(5));
        assert_eq!(h.len(), 3);
        assert!(!h.can_redo());
        assert_eq!(h.current(), &snap(5));
    }

    #[test]
    fn overflow_evicts_oldest_and_clamps_cursor() {
        let mut h = History::new(3);
        for i in 1..=5 {
            h.push(snap(i));
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.cursor(), 2);
        assert_eq!(h.current(), &snap(5));

        let mut undo_count = 0;
        while h.undo().is_some() {
            undo_count += 1;
        }
        assert_eq!(undo_count, 2);
        assert_eq!(h.current(), &snap(3));
    }

    #[test]
    fn overflow_right_after_undo_keeps_cursor_on_new_entry() {
        let mut h = History::new(3);
        h.push(snap(1));
        h.push(snap(2));
        h.undo();
        h.undo();
        // Cursor at 0, redo tail discarded by the push, no eviction needed.
        h.push(snap(7));
        assert_eq!(h.len(), 2);
        assert_eq!(h.cursor(), 1);
        h.push(snap(8));
        h.push(snap(9));
        assert_eq!(h.len(), 3);
        assert_eq!(h.cursor(), 2);
        assert_eq!(h.current(), &snap(9));
        assert_eq!(h.undo(), Some(&snap(8)));
    }

    #[test]
    fn limit_of_one_never_undoes() {
        let mut h = History::new(1);
        h.push(snap(1));
        h.push(snap(2));
        assert_eq!(h.len(), 1);
        assert_eq!(h.current(), &snap(2));
        assert!(h.undo().is_none());
    }

    #[test]
    fn reset_returns_to_single_empty_snapshot() {
        let mut h = History::new(4);
        h.push(snap(1));
        h.reset();
        assert_eq!(h.len(), 1);
        assert_eq!(h.cursor(), 0);
        assert_eq!(h.current(), &HistorySnapshot::default());
    }
}
