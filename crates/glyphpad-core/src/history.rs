//! Snapshot-based undo history.
//!
//! A checkpoint is always taken *before* the change it guards, so popping the
//! latest snapshot restores the canvas to exactly how it looked before that
//! change.

use crate::canvas::{CanvasState, Snapshot};

/// Observable state of the history stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryState {
    /// Nothing to undo.
    Empty,
    /// At least one snapshot is available.
    HasHistory,
}

/// Last-in-first-out stack of canvas snapshots.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    snapshots: Vec<Snapshot>,
    /// Maximum number of snapshots kept; `None` keeps everything.
    limit: Option<usize>,
}

impl HistoryStack {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` snapshots, dropping the oldest first.
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            limit: Some(limit.max(1)),
        }
    }

    /// Push a copy of the canvas's current strokes.
    pub fn checkpoint(&mut self, canvas: &CanvasState) {
        self.snapshots.push(canvas.snapshot());

        if let Some(limit) = self.limit {
            if self.snapshots.len() > limit {
                let excess = self.snapshots.len() - limit;
                self.snapshots.drain(..excess);
            }
        }
    }

    /// Restore the most recent snapshot into `canvas`.
    ///
    /// Returns true if undo was performed, false if there was nothing to undo
    /// (the canvas is left untouched).
    pub fn undo(&mut self, canvas: &mut CanvasState) -> bool {
        match self.snapshots.pop() {
            Some(snapshot) => {
                canvas.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Peek at the snapshot `undo` would restore.
    pub fn peek(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty()
    }

    pub fn state(&self) -> HistoryState {
        if self.snapshots.is_empty() {
            HistoryState::Empty
        } else {
            HistoryState::HasHistory
        }
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Drop all snapshots.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{SerializableColor, Stroke};
    use kurbo::Point;

    fn stroke(x: f64) -> Stroke {
        Stroke::new(Point::new(x, x), SerializableColor::black())
    }

    #[test]
    fn test_undo_empty_stack() {
        let mut history = HistoryStack::new();
        let mut canvas = CanvasState::new();
        canvas.append(stroke(1.0));
        let before = canvas.clone();

        assert_eq!(history.state(), HistoryState::Empty);
        assert!(!history.undo(&mut canvas));
        assert!(!history.undo(&mut canvas));
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_checkpoint_then_undo() {
        let mut history = HistoryStack::new();
        let mut canvas = CanvasState::new();

        history.checkpoint(&canvas);
        canvas.append(stroke(1.0));
        assert_eq!(history.state(), HistoryState::HasHistory);

        assert!(history.undo(&mut canvas));
        assert!(canvas.is_empty());
        assert_eq!(history.state(), HistoryState::Empty);
    }

    #[test]
    fn test_state_transitions() {
        let mut history = HistoryStack::new();
        let mut canvas = CanvasState::new();

        history.checkpoint(&canvas);
        history.checkpoint(&canvas);
        assert_eq!(history.len(), 2);

        history.undo(&mut canvas);
        assert_eq!(history.state(), HistoryState::HasHistory);
        history.undo(&mut canvas);
        assert_eq!(history.state(), HistoryState::Empty);
    }

    #[test]
    fn test_snapshot_survives_later_mutation() {
        let mut history = HistoryStack::new();
        let mut canvas = CanvasState::new();
        canvas.append(stroke(1.0));

        history.checkpoint(&canvas);
        canvas.append(stroke(2.0));
        canvas.append(stroke(3.0));

        assert_eq!(history.peek().unwrap().len(), 1);
        history.undo(&mut canvas);
        assert_eq!(canvas.len(), 1);
    }

    #[test]
    fn test_capacity_limit_drops_oldest() {
        let mut history = HistoryStack::with_capacity_limit(2);
        let mut canvas = CanvasState::new();

        for i in 0..4 {
            history.checkpoint(&canvas);
            canvas.append(stroke(i as f64));
        }

        assert_eq!(history.len(), 2);
        history.undo(&mut canvas);
        history.undo(&mut canvas);
        assert_eq!(canvas.len(), 2);
        assert!(!history.undo(&mut canvas));
    }
}
