//! Render context and export errors.

use kurbo::Size;
use peniko::Color;
use thiserror::Error;

/// Stroke width used by the drawing screen.
pub const DEFAULT_STROKE_WIDTH: f64 = 8.0;

/// Snapshot export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No drawing surface has been laid out, so there is nothing to capture.
    #[error("No drawing surface to capture")]
    EmptyExport,
    /// The surface is too large to allocate a pixel buffer for.
    #[error("Surface of {width}x{height} pixels is too large to capture")]
    SurfaceTooLarge { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

impl From<png::EncodingError> for ExportError {
    fn from(err: png::EncodingError) -> Self {
        ExportError::Encode(err.to_string())
    }
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Fixed rendering parameters for a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    /// Background color painted under the strokes.
    pub background_color: Color,
    /// Stroke width in canvas units.
    pub stroke_width: f64,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Whether edges are anti-aliased.
    pub anti_alias: bool,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext {
    /// Create a render context with the drawing screen's defaults.
    pub fn new() -> Self {
        Self {
            background_color: Color::from_rgba8(255, 255, 255, 255),
            stroke_width: DEFAULT_STROKE_WIDTH,
            scale_factor: 1.0,
            anti_alias: true,
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the stroke width.
    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    /// Pixel dimensions for a surface of logical `size`.
    ///
    /// Returns `None` when either side rounds to zero pixels. Sides beyond
    /// `u32::MAX` saturate.
    pub fn pixel_size(&self, size: Size) -> Option<(u32, u32)> {
        let width = (size.width * self.scale_factor).round();
        let height = (size.height * self.scale_factor).round();
        if !(width >= 1.0 && height >= 1.0) {
            return None;
        }
        Some((width as u32, height as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_size() {
        let ctx = RenderContext::new();
        assert_eq!(ctx.pixel_size(Size::new(360.0, 380.0)), Some((360, 380)));

        let hidpi = RenderContext::new().with_scale_factor(2.0);
        assert_eq!(hidpi.pixel_size(Size::new(10.0, 5.5)), Some((20, 11)));
    }

    #[test]
    fn test_pixel_size_rejects_empty() {
        let ctx = RenderContext::new();
        assert_eq!(ctx.pixel_size(Size::new(0.0, 100.0)), None);
        assert_eq!(ctx.pixel_size(Size::new(100.0, 0.2)), None);
        assert_eq!(ctx.pixel_size(Size::new(f64::NAN, 10.0)), None);
    }
}
