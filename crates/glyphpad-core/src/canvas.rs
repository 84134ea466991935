//! Canvas state: the ordered list of committed strokes.

use crate::stroke::{Stroke, StrokeId};
use kurbo::Rect;
use std::sync::Arc;

/// An immutable copy of the canvas's stroke list at one point in time.
///
/// Strokes are shared, the list is not: mutating the canvas after taking a
/// snapshot never changes the snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    strokes: Vec<Arc<Stroke>>,
}

impl Snapshot {
    /// Strokes in z-order (back to front).
    pub fn strokes(&self) -> &[Arc<Stroke>] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub(crate) fn into_strokes(self) -> Vec<Arc<Stroke>> {
        self.strokes
    }
}

/// The current drawing.
///
/// Insertion order is z-order and chronological order. Rendering is a pure
/// function of [`CanvasState::strokes`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasState {
    strokes: Vec<Arc<Stroke>>,
}

impl CanvasState {
    /// Create an empty canvas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a completed stroke on top of the drawing.
    pub fn append(&mut self, stroke: Stroke) {
        self.strokes.push(Arc::new(stroke));
    }

    /// Replace the whole drawing.
    pub fn replace_all(&mut self, strokes: Vec<Arc<Stroke>>) {
        self.strokes = strokes;
    }

    /// Remove every stroke.
    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Strokes in z-order (back to front).
    pub fn strokes(&self) -> &[Arc<Stroke>] {
        &self.strokes
    }

    /// Copy the stroke list for the undo history.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            strokes: self.strokes.clone(),
        }
    }

    /// Restore the stroke list from a snapshot.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.replace_all(snapshot.into_strokes());
    }

    /// Get a stroke by ID.
    pub fn get(&self, id: StrokeId) -> Option<&Arc<Stroke>> {
        self.strokes.iter().find(|s| s.id() == id)
    }

    /// Get the bounding box of all strokes.
    pub fn bounds(&self) -> Option<Rect> {
        self.strokes
            .iter()
            .map(|s| s.bounds())
            .reduce(|a, b| a.union(b))
    }

    /// Check if the canvas has no strokes.
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Get the number of strokes.
    pub fn len(&self) -> usize {
        self.strokes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::SerializableColor;
    use kurbo::Point;

    fn stroke(x: f64) -> Stroke {
        Stroke::from_points(
            &[Point::new(x, 0.0), Point::new(x, 10.0)],
            SerializableColor::black(),
        )
        .unwrap()
    }

    #[test]
    fn test_canvas_creation() {
        let canvas = CanvasState::new();
        assert!(canvas.is_empty());
        assert!(canvas.bounds().is_none());
    }

    #[test]
    fn test_append_keeps_order() {
        let mut canvas = CanvasState::new();
        let first = stroke(0.0);
        let second = stroke(5.0);
        let (id1, id2) = (first.id(), second.id());

        canvas.append(first);
        canvas.append(second);

        let ids: Vec<_> = canvas.strokes().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![id1, id2]);
        assert!(canvas.get(id2).is_some());
    }

    #[test]
    fn test_replace_all() {
        let mut canvas = CanvasState::new();
        canvas.append(stroke(0.0));
        canvas.append(stroke(1.0));

        canvas.replace_all(Vec::new());
        assert!(canvas.is_empty());

        canvas.replace_all(vec![Arc::new(stroke(2.0))]);
        assert_eq!(canvas.len(), 1);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut canvas = CanvasState::new();
        canvas.append(stroke(0.0));

        let snapshot = canvas.snapshot();
        canvas.append(stroke(1.0));
        canvas.clear();

        assert_eq!(snapshot.len(), 1);
        canvas.restore(snapshot.clone());
        assert_eq!(canvas.strokes(), snapshot.strokes());
    }

    #[test]
    fn test_bounds() {
        let mut canvas = CanvasState::new();
        canvas.append(stroke(0.0));
        canvas.append(stroke(20.0));

        let bounds = canvas.bounds().unwrap();
        assert!((bounds.x1 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 10.0).abs() < f64::EPSILON);
    }
}
