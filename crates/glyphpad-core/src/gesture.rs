//! Binds pointer gestures and the clear/undo buttons to the drawing state.

use crate::canvas::CanvasState;
use crate::history::HistoryStack;
use crate::input::PointerEvent;
use crate::path_builder::{GestureError, PathBuilder};
use crate::stroke::{Stroke, StrokeId};
use kurbo::Point;

/// Default travel (in canvas units) before a move sample is recorded.
pub const DEFAULT_MIN_DISTANCE: f64 = 1.0;

/// Owns the drawing state of one screen session.
///
/// Only one gesture may be open at a time. Every stroke commit and every clear
/// is preceded by a history checkpoint.
#[derive(Debug, Clone)]
pub struct GestureController {
    builder: PathBuilder,
    canvas: CanvasState,
    history: HistoryStack,
    /// Minimum travel from the last recorded point before a move counts.
    min_distance: f64,
    /// Set while an export is reading the canvas.
    locked: bool,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureController {
    /// Create a controller with an empty canvas and history.
    pub fn new() -> Self {
        Self {
            builder: PathBuilder::new(),
            canvas: CanvasState::new(),
            history: HistoryStack::new(),
            min_distance: DEFAULT_MIN_DISTANCE,
            locked: false,
        }
    }

    /// Use a preconfigured path builder (color, coalescing).
    pub fn with_builder(mut self, builder: PathBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Use a preconfigured history (e.g. with a capacity limit).
    pub fn with_history(mut self, history: HistoryStack) -> Self {
        self.history = history;
        self
    }

    /// Set the minimum move distance (negative values are treated as zero).
    pub fn with_min_distance(mut self, min_distance: f64) -> Self {
        self.min_distance = min_distance.max(0.0);
        self
    }

    /// Dispatch a pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position } => {
                self.pointer_start(position);
            }
            PointerEvent::Move { position } => {
                self.pointer_move(position);
            }
            PointerEvent::Up => {
                self.pointer_end();
            }
            PointerEvent::Cancel => self.pointer_cancel(),
        }
    }

    /// Start a stroke. Returns false if the start was ignored.
    pub fn pointer_start(&mut self, point: Point) -> bool {
        if self.reject_if_locked("pointer start") {
            return false;
        }
        self.builder.begin(point).is_ok()
    }

    /// Extend the open stroke. Returns true if the sample was recorded.
    ///
    /// Samples closer than the minimum distance to the origin are ignored
    /// until the stroke has left its origin.
    pub fn pointer_move(&mut self, point: Point) -> bool {
        if self.reject_if_locked("pointer move") {
            return false;
        }
        // The distance threshold only activates the gesture; once the first
        // segment is recorded every sample counts, so the end point is kept.
        if let Some(stroke) = self.builder.current() {
            if stroke.is_point() && stroke.origin().distance(point) < self.min_distance {
                return false;
            }
        }
        matches!(self.builder.extend(point), Ok(true))
    }

    /// Finish the open stroke and commit it to the canvas.
    ///
    /// Returns the committed stroke's ID, or `None` when there was nothing to
    /// commit.
    pub fn pointer_end(&mut self) -> Option<StrokeId> {
        if self.reject_if_locked("pointer end") {
            return None;
        }
        let Some(stroke) = self.builder.end() else {
            log::debug!("{}", GestureError::NoOpenStroke);
            return None;
        };
        self.commit(stroke)
    }

    /// Drop the open stroke without committing it.
    pub fn pointer_cancel(&mut self) {
        self.builder.cancel();
    }

    fn commit(&mut self, stroke: Stroke) -> Option<StrokeId> {
        if stroke.is_empty() {
            return None;
        }
        let id = stroke.id();
        self.history.checkpoint(&self.canvas);
        self.canvas.append(stroke);
        log::debug!("Committed stroke {id} ({} strokes)", self.canvas.len());
        Some(id)
    }

    /// Remove every stroke, keeping the previous drawing undoable.
    ///
    /// A stroke still being drawn is discarded.
    pub fn clear(&mut self) -> bool {
        if self.reject_if_locked("clear") {
            return false;
        }
        self.builder.cancel();
        self.history.checkpoint(&self.canvas);
        self.canvas.clear();
        true
    }

    /// Restore the canvas as it was before the last commit or clear.
    ///
    /// Returns true if undo was performed.
    pub fn undo(&mut self) -> bool {
        if self.reject_if_locked("undo") {
            return false;
        }
        self.builder.cancel();
        self.history.undo(&mut self.canvas)
    }

    /// Freeze the canvas while an export reads it.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn reject_if_locked(&self, what: &str) -> bool {
        if self.locked {
            log::warn!("Ignoring {what}: {}", GestureError::Locked);
        }
        self.locked
    }

    /// The committed drawing.
    pub fn canvas(&self) -> &CanvasState {
        &self.canvas
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn builder(&self) -> &PathBuilder {
        &self.builder
    }

    /// Mutable access to the builder (e.g. to change the pen color).
    pub fn builder_mut(&mut self) -> &mut PathBuilder {
        &mut self.builder
    }

    /// The stroke currently being drawn, for live preview.
    pub fn preview(&self) -> Option<&Stroke> {
        self.builder.current()
    }

    /// Check if a gesture is open.
    pub fn is_drawing(&self) -> bool {
        self.builder.is_open()
    }
}
