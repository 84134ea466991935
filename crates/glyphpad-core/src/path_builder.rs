//! Accumulates pointer samples into a single stroke.

use crate::stroke::{SerializableColor, Stroke};
use kurbo::Point;
use thiserror::Error;

/// Errors raised by stroke capture.
///
/// These are internal guards: the gesture layer logs and absorbs them, they
/// never reach the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GestureError {
    #[error("No stroke is open")]
    NoOpenStroke,
    #[error("A stroke is already open")]
    StrokeAlreadyOpen,
    #[error("Canvas is locked for export")]
    Locked,
}

/// Result type for stroke capture operations.
pub type GestureResult<T> = Result<T, GestureError>;

/// Builds one stroke at a time from pointer samples.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    /// The stroke being drawn, if any.
    open: Option<Stroke>,
    /// Color applied to new strokes.
    color: SerializableColor,
    /// Samples closer than this to the last recorded point are dropped.
    /// Zero records every sample.
    coalesce_epsilon: f64,
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self {
            open: None,
            color: SerializableColor::black(),
            coalesce_epsilon: 0.0,
        }
    }
}

impl PathBuilder {
    /// Create a new path builder drawing in black.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the color used for strokes started after this call.
    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.color = color;
        self
    }

    /// Set the coalescing distance (negative values are treated as zero).
    pub fn with_coalesce_epsilon(mut self, epsilon: f64) -> Self {
        self.coalesce_epsilon = epsilon.max(0.0);
        self
    }

    /// Set the color used for strokes started after this call.
    pub fn set_color(&mut self, color: SerializableColor) {
        self.color = color;
    }

    /// Color applied to new strokes.
    pub fn color(&self) -> SerializableColor {
        self.color
    }

    /// Open a new stroke at `point`.
    pub fn begin(&mut self, point: Point) -> GestureResult<()> {
        if self.open.is_some() {
            log::warn!("Ignoring stroke start at ({}, {}): a stroke is already open", point.x, point.y);
            return Err(GestureError::StrokeAlreadyOpen);
        }
        self.open = Some(Stroke::new(point, self.color));
        Ok(())
    }

    /// Append a line segment to the open stroke.
    ///
    /// Returns `Ok(false)` when the sample was coalesced into the previous one.
    pub fn extend(&mut self, point: Point) -> GestureResult<bool> {
        let Some(stroke) = self.open.as_mut() else {
            log::debug!("Ignoring stroke sample: no stroke is open");
            return Err(GestureError::NoOpenStroke);
        };

        if self.coalesce_epsilon > 0.0 && stroke.last_point().distance(point) < self.coalesce_epsilon {
            return Ok(false);
        }

        stroke.line_to(point);
        Ok(true)
    }

    /// Close the open stroke and hand it over.
    pub fn end(&mut self) -> Option<Stroke> {
        self.open.take()
    }

    /// Discard the open stroke without returning it.
    pub fn cancel(&mut self) {
        if self.open.take().is_some() {
            log::debug!("Cancelled open stroke");
        }
    }

    /// Check if a stroke is currently open.
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// The stroke being drawn, for live preview.
    pub fn current(&self) -> Option<&Stroke> {
        self.open.as_ref()
    }
}
